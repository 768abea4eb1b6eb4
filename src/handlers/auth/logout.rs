use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::auth::cookies::{self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::database::manager::DatabaseManager;
use crate::database::models::user::UserPublic;
use crate::database::repositories::users;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;

/// POST /api/v1/auth/logout - requires an authenticated session.
///
/// Idempotent: clearing an already-absent refresh token is a no-op.
pub async fn logout(
    Extension(current_user): Extension<UserPublic>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let pool = DatabaseManager::pool().await?;
    users::set_refresh_token(pool, current_user.id, None).await?;

    let jar = jar
        .remove(cookies::removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(cookies::removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, ApiResponse::ok(json!({}), "User logged out successfully")))
}
