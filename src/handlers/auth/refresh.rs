use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::extract::Body;
use crate::auth::{self, cookies, session};
use crate::auth::session::TokenPair;
use crate::database::manager::DatabaseManager;
use crate::database::repositories::users;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// GET /api/v1/auth/refresh-tokens
///
/// Exchanges the refresh token (cookie or body) for a new session. Each
/// exchange rotates the stored token, so a superseded token presented again
/// is rejected as expired or used.
pub async fn refresh_tokens(
    jar: CookieJar,
    payload: Option<Body<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<TokenPair>), ApiError> {
    let incoming = jar
        .get(cookies::REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| payload.and_then(|Body(body)| body.refresh_token))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = auth::verify_refresh_token(&incoming)
        .map_err(|_| ApiError::unauthorized("Token is invalid"))?;

    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_id(pool, claims.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    // Exact match against the stored token detects reuse of a superseded one
    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }

    let tokens = session::rotate_session(pool, &user).await?;

    let jar = jar
        .add(cookies::access_token_cookie(&tokens.access_token))
        .add(cookies::refresh_token_cookie(&tokens.refresh_token));

    Ok((jar, ApiResponse::ok(tokens, "Access token refreshed")))
}
