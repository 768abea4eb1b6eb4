use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

use crate::auth;
use crate::auth::cookies::ACCESS_TOKEN_COOKIE;
use crate::database::manager::DatabaseManager;
use crate::database::repositories::users;
use crate::error::ApiError;

/// Session middleware: resolves the bearer credential to a sanitized user
/// and attaches it to the request as a `UserPublic` extension. Every failure
/// on this path is a 401 envelope, never a 500.
pub async fn session_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = auth::verify_access_token(&token)
        .map_err(|_| ApiError::unauthorized("Invalid Access Token"))?;

    let pool = DatabaseManager::pool().await.map_err(|e| {
        tracing::error!("Database unavailable during authentication: {}", e);
        ApiError::unauthorized("Invalid Access Token")
    })?;

    let user = users::find_by_id(pool, claims.id)
        .await
        .map_err(|e| {
            tracing::error!("User lookup failed during authentication: {}", e);
            ApiError::unauthorized("Invalid Access Token")
        })?
        .ok_or_else(|| ApiError::unauthorized("Invalid Access Token"))?;

    request.extensions_mut().insert(user.sanitized());
    Ok(next.run(request).await)
}

/// The `accessToken` cookie takes precedence over the Authorization header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    bearer_token(headers)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
