use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Admin,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Full user row. Deliberately not `Serialize`: the password hash and the
/// refresh token must never reach a response body, so handlers go through
/// [`User::sanitized`] for anything client-facing.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub role: Role,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// One-way adaptive hash, computed on the write path only (creation and
    /// password change).
    pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(plain, bcrypt::DEFAULT_COST)
    }

    pub fn verify_password(&self, plain: &str) -> bool {
        bcrypt::verify(plain, &self.password).unwrap_or(false)
    }

    pub fn sanitized(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            last_login: self.last_login,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Client-facing view of a user, also attached to the request context by the
/// session middleware.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allow-listed profile fields; anything else a client sends is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.avatar.is_none()
    }
}
