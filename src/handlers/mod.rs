pub mod auth;
pub mod dashboard;
pub mod notes;
pub mod projects;
pub mod tasks;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Validate a path id before touching the database.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid id"))
}

/// Required-field semantics for request bodies: absent, empty and
/// whitespace-only values all count as missing.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
