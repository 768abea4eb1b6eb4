use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Body;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::database::repositories::users::{self, NewUser};
use crate::error::ApiError;
use crate::handlers::required;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Opaque reference into the external media store; uploads themselves
    /// are not handled here.
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

/// POST /api/v1/auth/register
pub async fn register(Body(payload): Body<RegisterRequest>) -> ApiResult<Value> {
    let (Some(full_name), Some(username), Some(email), Some(password)) = (
        required(&payload.full_name),
        required(&payload.username),
        required(&payload.email),
        required(&payload.password),
    ) else {
        return Err(ApiError::bad_request("All fields are required."));
    };

    if !email.contains('@') {
        return Err(ApiError::bad_request("Valid email is required"));
    }
    if password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let pool = DatabaseManager::pool().await?;

    if users::exists_by_username_or_email(pool, username, email).await? {
        return Err(ApiError::conflict("User with Email or Username already exists"));
    }

    // Hash on the write path; the stored row never sees the plain password
    let password_hash = User::hash_password(password)?;

    users::create(
        pool,
        NewUser {
            full_name,
            username,
            email,
            password_hash: &password_hash,
            avatar: required(&payload.avatar),
            bio: required(&payload.bio),
        },
    )
    .await?;

    // The password and refresh token are never echoed back
    Ok(ApiResponse::created(json!({}), "User registered successfully."))
}
