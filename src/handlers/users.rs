use axum::{extract::Path, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Body;
use crate::auth::policy;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::{ProfileUpdate, Role, User, UserPublic};
use crate::database::repositories::users;
use crate::error::ApiError;
use crate::handlers::{parse_id, required};
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/v1/users/get-all-users
pub async fn get_all_users(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<Vec<UserPublic>> {
    let pool = DatabaseManager::pool().await?;
    let all_users: Vec<UserPublic> = users::list_except(pool, current_user.id)
        .await?
        .iter()
        .map(User::sanitized)
        .collect();

    let message = if all_users.is_empty() {
        "No users found"
    } else {
        "Users fetched successfully."
    };
    Ok(ApiResponse::ok(all_users, message))
}

/// GET /api/v1/users/get-current-user
pub async fn get_current_user(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<UserPublic> {
    Ok(ApiResponse::ok(
        current_user,
        "Current User fetched successfully.",
    ))
}

/// GET /api/v1/users/get-user-by-id/:userId
pub async fn get_user_by_id(Path(user_id): Path<String>) -> ApiResult<UserPublic> {
    let user_id = parse_id(&user_id)?;
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No user found"))?;

    Ok(ApiResponse::ok(user.sanitized(), "User found successfully."))
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// PATCH /api/v1/users/update-user-role/:userId - Admin only
pub async fn update_user_role(
    Extension(current_user): Extension<UserPublic>,
    Path(user_id): Path<String>,
    Body(payload): Body<RoleUpdateRequest>,
) -> ApiResult<Value> {
    policy::require_admin(&current_user)?;
    let user_id = parse_id(&user_id)?;
    let pool = DatabaseManager::pool().await?;

    if !users::set_role(pool, user_id, payload.role).await? {
        return Err(ApiError::not_found("User doesn't exist"));
    }

    Ok(ApiResponse::ok(
        json!({ "id": user_id }),
        "User role updated successfully.",
    ))
}

/// DELETE /api/v1/users/delete-user/:userId - Admin only
pub async fn delete_user(
    Extension(current_user): Extension<UserPublic>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    let user_id = parse_id(&user_id)?;
    if user_id == current_user.id {
        return Err(ApiError::bad_request(
            "You can't delete yourself via this route.",
        ));
    }
    policy::require_admin(&current_user)?;

    let pool = DatabaseManager::pool().await?;
    if !users::delete(pool, user_id).await? {
        return Err(ApiError::not_found("User doesn't exist"));
    }

    Ok(ApiResponse::ok(
        json!({ "id": user_id }),
        "User deleted successfully.",
    ))
}

/// DELETE /api/v1/users/delete-current-user-account
pub async fn delete_current_user_account(
    Extension(current_user): Extension<UserPublic>,
) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    if !users::delete(pool, current_user.id).await? {
        return Err(ApiError::internal("Unable to delete the user account"));
    }

    Ok(ApiResponse::ok(json!({}), "User account deleted successfully."))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// PATCH /api/v1/users/change-password
pub async fn change_password(
    Extension(current_user): Extension<UserPublic>,
    Body(payload): Body<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let (Some(old_password), Some(new_password)) = (
        required(&payload.old_password),
        required(&payload.new_password),
    ) else {
        return Err(ApiError::bad_request("Old and new password are required"));
    };
    if new_password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_id(pool, current_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !user.verify_password(old_password) {
        return Err(ApiError::bad_request("Invalid Password"));
    }

    let password_hash = User::hash_password(new_password)?;
    users::set_password(pool, user.id, &password_hash).await?;

    Ok(ApiResponse::ok(json!({}), "Password Changed Successfully"))
}

/// PATCH /api/v1/users/update-profile
///
/// Allow-listed partial update; unknown client fields never reach storage.
pub async fn update_profile(
    Extension(current_user): Extension<UserPublic>,
    Body(update): Body<ProfileUpdate>,
) -> ApiResult<UserPublic> {
    if update.is_empty() {
        return Err(ApiError::bad_request("At least one field is required."));
    }

    let pool = DatabaseManager::pool().await?;
    let user = users::update_profile(pool, current_user.id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        user.sanitized(),
        "User profile updated successfully.",
    ))
}
