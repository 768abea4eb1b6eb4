use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::api::extract::Body;
use crate::auth::{cookies, session};
use crate::database::manager::DatabaseManager;
use crate::database::models::user::UserPublic;
use crate::database::repositories::users;
use crate::error::ApiError;
use crate::handlers::required;
use crate::middleware::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserPublic,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/auth/login
///
/// Tokens are delivered both as cookies and in the body so non-cookie
/// clients can authenticate with the bearer header.
pub async fn login(
    jar: CookieJar,
    Body(payload): Body<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    let Some(identifier) = required(&payload.identifier) else {
        return Err(ApiError::bad_request("Username or Email is required"));
    };
    let Some(password) = required(&payload.password) else {
        return Err(ApiError::bad_request("Password is required"));
    };

    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_identifier(pool, identifier)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exists"))?;

    if !user.verify_password(password) {
        return Err(ApiError::unauthorized("Password is Incorrect"));
    }

    users::update_last_login(pool, user.id).await?;
    let tokens = session::rotate_session(pool, &user).await?;

    // Re-read so the response reflects the login just recorded
    let logged_in = users::find_by_id(pool, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exists"))?;

    let jar = jar
        .add(cookies::access_token_cookie(&tokens.access_token))
        .add(cookies::refresh_token_cookie(&tokens.refresh_token));

    let response = LoginResponse {
        user: logged_in.sanitized(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((jar, ApiResponse::ok(response, "User logged in Successfully")))
}
