pub mod cookies;
pub mod policy;
pub mod session;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::user::User;

/// Claims for the short-lived access token: enough identity to authorize a
/// request without a database round trip.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims for the long-lived refresh token: the user id and nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token secret not configured")]
    MissingSecret,
}

pub fn issue_access_token(user: &User) -> Result<String, TokenError> {
    let security = &config::config().security;
    let now = Utc::now();
    let claims = AccessClaims {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        exp: (now + Duration::hours(security.access_token_ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };
    sign(&claims, &security.access_token_secret)
}

pub fn issue_refresh_token(user_id: Uuid) -> Result<String, TokenError> {
    let security = &config::config().security;
    let now = Utc::now();
    let claims = RefreshClaims {
        id: user_id,
        exp: (now + Duration::days(security.refresh_token_ttl_days)).timestamp(),
        iat: now.timestamp(),
    };
    sign(&claims, &security.refresh_token_secret)
}

pub fn verify_access_token(token: &str) -> Result<AccessClaims, TokenError> {
    verify(token, &config::config().security.access_token_secret)
}

pub fn verify_refresh_token(token: &str) -> Result<RefreshClaims, TokenError> {
    verify(token, &config::config().security.refresh_token_secret)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    let token_data = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))?;
    Ok(token_data.claims)
}
