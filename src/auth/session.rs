use serde::Serialize;
use sqlx::PgPool;

use crate::database::models::user::User;
use crate::database::repositories::users;
use crate::error::ApiError;

const ROTATE_FAILURE: &str = "Something went wrong while generating access and refresh token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a fresh access/refresh pair and persist the refresh token on the
/// user record, superseding any previously issued one. Rotation-on-use is
/// what invalidates stale refresh tokens.
pub async fn rotate_session(pool: &PgPool, user: &User) -> Result<TokenPair, ApiError> {
    let access_token = super::issue_access_token(user).map_err(generation_failure)?;
    let refresh_token = super::issue_refresh_token(user.id).map_err(generation_failure)?;

    users::set_refresh_token(pool, user.id, Some(&refresh_token))
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist refresh token: {}", e);
            ApiError::internal(ROTATE_FAILURE)
        })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn generation_failure(err: super::TokenError) -> ApiError {
    tracing::error!("Token generation failed: {}", err);
    ApiError::internal(ROTATE_FAILURE)
}
