use axum::Extension;
use serde::Serialize;

use crate::auth::policy;
use crate::database::manager::DatabaseManager;
use crate::database::models::task::Task;
use crate::database::models::user::UserPublic;
use crate::database::repositories::{notes, projects, tasks, users};
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub total_notes: i64,
    pub total_projects: i64,
    pub recent_tasks: Vec<Task>,
}

/// GET /api/v1/dashboard/user
///
/// An empty account yields all-zero counts and an empty recent list, never a
/// not-found.
pub async fn user_stats(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<UserDashboardStats> {
    let pool = DatabaseManager::pool().await?;

    let (task_counts, total_notes, total_projects, recent_tasks) = tokio::try_join!(
        tasks::status_counts_for_user(pool, current_user.id),
        notes::count_for_user(pool, current_user.id),
        projects::count_for_user(pool, current_user.id),
        tasks::recent_for_user(pool, current_user.id, 5),
    )?;

    Ok(ApiResponse::ok(
        UserDashboardStats {
            total_tasks: task_counts.total,
            completed_tasks: task_counts.completed,
            pending_tasks: task_counts.pending,
            total_notes,
            total_projects,
            recent_tasks,
        },
        "User dashboard statistics",
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_tasks: i64,
    pub total_notes: i64,
    pub total_projects: i64,
}

/// GET /api/v1/dashboard/admin - platform-wide counts, Admin only
pub async fn admin_stats(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<AdminDashboardStats> {
    policy::require_admin(&current_user)?;

    let pool = DatabaseManager::pool().await?;
    let (total_users, total_tasks, total_notes, total_projects) = tokio::try_join!(
        users::count(pool),
        tasks::count(pool),
        notes::count(pool),
        projects::count(pool),
    )?;

    Ok(ApiResponse::ok(
        AdminDashboardStats {
            total_users,
            total_tasks,
            total_notes,
            total_projects,
        },
        "Admin dashboard statistics",
    ))
}
