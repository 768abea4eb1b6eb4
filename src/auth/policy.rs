use uuid::Uuid;

use crate::database::models::user::{Role, UserPublic};
use crate::error::ApiError;

/// Owner-or-Admin rule, applied inside every handler that reads or mutates a
/// single entity.
pub fn require_owner_or_admin(owner_id: Uuid, current_user: &UserPublic) -> Result<(), ApiError> {
    if owner_id == current_user.id || current_user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Forbidden"))
    }
}

pub fn require_admin(current_user: &UserPublic) -> Result<(), ApiError> {
    if current_user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Forbidden"))
    }
}

/// Owner scoping for list/search queries: `None` means unscoped (Admin).
pub fn owner_scope(current_user: &UserPublic) -> Option<Uuid> {
    match current_user.role {
        Role::Admin => None,
        Role::User => Some(current_user.id),
    }
}
