use axum::extract::{Path, Query};
use axum::Extension;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Body;
use crate::auth::policy;
use crate::database::manager::DatabaseManager;
use crate::database::models::task::{Task, TaskPriority, TaskStatus, TaskUpdate};
use crate::database::models::user::UserPublic;
use crate::database::repositories::tasks::{self, NewTask, TaskSearch};
use crate::error::ApiError;
use crate::handlers::{parse_id, required};
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// POST /api/v1/tasks/create
pub async fn create_task(
    Extension(current_user): Extension<UserPublic>,
    Body(payload): Body<CreateTaskRequest>,
) -> ApiResult<Task> {
    let (Some(title), Some(description)) = (
        required(&payload.title),
        required(&payload.description),
    ) else {
        return Err(ApiError::bad_request("Title and description are required"));
    };

    let pool = DatabaseManager::pool().await?;
    let task = tasks::create(
        pool,
        NewTask {
            title: title.to_string(),
            description: description.to_string(),
            status: payload.status.unwrap_or_default(),
            priority: payload.priority.unwrap_or_default(),
            due_date: payload
                .due_date
                .unwrap_or_else(|| Utc::now() + Duration::hours(24)),
            user_id: current_user.id,
        },
    )
    .await?;

    Ok(ApiResponse::created(task, "Task created successfully"))
}

/// GET /api/v1/tasks/get-tasks - current user's tasks, most recent first
pub async fn get_tasks(Extension(current_user): Extension<UserPublic>) -> ApiResult<Vec<Task>> {
    let pool = DatabaseManager::pool().await?;
    let tasks = tasks::list_for_user(pool, current_user.id).await?;
    Ok(ApiResponse::ok(tasks, "Tasks fetched successfully"))
}

/// GET /api/v1/tasks/get-task-by-id/:id
pub async fn get_task_by_id(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let task = tasks::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    policy::require_owner_or_admin(task.user_id, &current_user)?;

    Ok(ApiResponse::ok(task, "Task fetched successfully"))
}

/// PATCH /api/v1/tasks/update-task/:id
pub async fn update_task(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
    Body(update): Body<TaskUpdate>,
) -> ApiResult<Task> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let task = tasks::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    policy::require_owner_or_admin(task.user_id, &current_user)?;

    if update.is_empty() {
        return Ok(ApiResponse::ok(task, "No updatable fields provided"));
    }

    let updated = tasks::update(pool, id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    Ok(ApiResponse::ok(updated, "Task updated successfully"))
}

/// DELETE /api/v1/tasks/delete-task/:id
pub async fn delete_task(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let task = tasks::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    policy::require_owner_or_admin(task.user_id, &current_user)?;

    tasks::delete(pool, id).await?;
    Ok(ApiResponse::ok(json!({}), "Task deleted successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSearchQuery {
    pub q: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
}

/// GET /api/v1/tasks/search - owner-scoped unless the caller is Admin
pub async fn search_tasks(
    Extension(current_user): Extension<UserPublic>,
    Query(query): Query<TaskSearchQuery>,
) -> ApiResult<Vec<Task>> {
    let pool = DatabaseManager::pool().await?;
    let results = tasks::search(
        pool,
        &TaskSearch {
            owner: policy::owner_scope(&current_user),
            q: query.q,
            status: query.status,
            priority: query.priority,
            due_from: query.due_from,
            due_to: query.due_to,
            limit: None,
        },
    )
    .await?;

    Ok(ApiResponse::ok(results, "Search results"))
}

/// GET /api/v1/tasks/get-all-tasks - Admin only, 10 most recent matches
pub async fn get_all_tasks(
    Extension(current_user): Extension<UserPublic>,
    Query(query): Query<TaskSearchQuery>,
) -> ApiResult<Vec<Task>> {
    policy::require_admin(&current_user)?;

    let pool = DatabaseManager::pool().await?;
    let results = tasks::search(
        pool,
        &TaskSearch {
            owner: None,
            q: query.q,
            status: query.status,
            priority: query.priority,
            due_from: None,
            due_to: None,
            limit: Some(10),
        },
    )
    .await?;

    Ok(ApiResponse::ok(results, "All tasks fetched"))
}
