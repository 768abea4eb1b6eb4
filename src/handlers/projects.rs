use axum::extract::Path;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Body;
use crate::auth::policy;
use crate::database::manager::DatabaseManager;
use crate::database::models::project::{Project, ProjectStatus, ProjectUpdate, ProjectWithTasks};
use crate::database::models::task::Task;
use crate::database::models::user::UserPublic;
use crate::database::repositories::{projects, tasks};
use crate::error::ApiError;
use crate::handlers::{parse_id, required};
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

/// POST /api/v1/projects/create
pub async fn create_project(
    Extension(current_user): Extension<UserPublic>,
    Body(payload): Body<CreateProjectRequest>,
) -> ApiResult<Project> {
    let (Some(name), Some(description)) = (
        required(&payload.name),
        required(&payload.description),
    ) else {
        return Err(ApiError::bad_request("Name and description are required"));
    };

    let pool = DatabaseManager::pool().await?;
    let project = projects::create(
        pool,
        projects::NewProject {
            name: name.to_string(),
            description: description.to_string(),
            status: payload.status.unwrap_or_default(),
            user_id: current_user.id,
        },
    )
    .await?;

    Ok(ApiResponse::created(project, "Project created"))
}

/// GET /api/v1/projects/get-projects - current user's projects
pub async fn get_projects(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<Vec<Project>> {
    let pool = DatabaseManager::pool().await?;
    let projects = projects::list_for_user(pool, current_user.id).await?;
    Ok(ApiResponse::ok(projects, "Projects fetched"))
}

/// GET /api/v1/projects/get-project-by-id/:id - task references populated
pub async fn get_project_by_id(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<ProjectWithTasks> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    let project_tasks = tasks::find_by_ids(pool, &project.tasks).await?;
    Ok(ApiResponse::ok(
        ProjectWithTasks::new(project, project_tasks),
        "Project fetched",
    ))
}

/// PATCH /api/v1/projects/update-project/:id
pub async fn update_project(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
    Body(update): Body<ProjectUpdate>,
) -> ApiResult<Project> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    // Task membership is managed through the add/remove endpoints, not here
    if update.is_empty() {
        return Ok(ApiResponse::ok(project, "No updatable fields provided"));
    }

    let updated = projects::update(pool, id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(ApiResponse::ok(updated, "Project updated"))
}

/// DELETE /api/v1/projects/delete-project/:id
///
/// Deleting a project never deletes the tasks it references.
pub async fn delete_project(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    projects::delete(pool, id).await?;
    Ok(ApiResponse::ok(json!({}), "Project deleted"))
}

/// POST /api/v1/projects/add-task-to-project/:taskId/:projectId - idempotent
pub async fn add_task_to_project(
    Extension(current_user): Extension<UserPublic>,
    Path((task_id, project_id)): Path<(String, String)>,
) -> ApiResult<Project> {
    let task_id = parse_id(&task_id)?;
    let project_id = parse_id(&project_id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, project_id).await?;
    let task = tasks::find_by_id(pool, task_id).await?;
    let (Some(project), Some(_task)) = (project, task) else {
        return Err(ApiError::not_found("Project or Task not found"));
    };
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    // None means the reference was already present; keep the stored state
    let project = match projects::add_task(pool, project.id, task_id).await? {
        Some(updated) => updated,
        None => project,
    };

    Ok(ApiResponse::ok(project, "Task added to project"))
}

/// PATCH /api/v1/projects/remove-task-from-project/:taskId/:projectId
///
/// Removing a reference that is not in the project is a no-op.
pub async fn remove_task_from_project(
    Extension(current_user): Extension<UserPublic>,
    Path((task_id, project_id)): Path<(String, String)>,
) -> ApiResult<Project> {
    let task_id = parse_id(&task_id)?;
    let project_id = parse_id(&project_id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    let project = projects::remove_task(pool, project.id, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(ApiResponse::ok(project, "Task removed from project"))
}

/// GET /api/v1/projects/get-project-tasks/:id
pub async fn get_project_tasks(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Task>> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let project = projects::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    policy::require_owner_or_admin(project.user_id, &current_user)?;

    let project_tasks = tasks::find_by_ids(pool, &project.tasks).await?;
    Ok(ApiResponse::ok(project_tasks, "Project tasks"))
}
