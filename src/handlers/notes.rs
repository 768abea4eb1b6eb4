use axum::extract::{Path, Query};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Body;
use crate::auth::policy;
use crate::database::manager::DatabaseManager;
use crate::database::models::note::{Note, NoteTag, NoteUpdate};
use crate::database::models::user::UserPublic;
use crate::database::repositories::notes::{self, NewNote, NoteSearch};
use crate::error::ApiError;
use crate::handlers::{parse_id, required};
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag: Option<NoteTag>,
}

/// POST /api/v1/notes/create
pub async fn create_note(
    Extension(current_user): Extension<UserPublic>,
    Body(payload): Body<CreateNoteRequest>,
) -> ApiResult<Note> {
    let (Some(title), Some(content)) = (
        required(&payload.title),
        required(&payload.content),
    ) else {
        return Err(ApiError::bad_request("Title and content are required"));
    };

    let pool = DatabaseManager::pool().await?;
    let note = notes::create(
        pool,
        NewNote {
            title: title.to_string(),
            content: content.to_string(),
            tag: payload.tag.unwrap_or_default(),
            user_id: current_user.id,
        },
    )
    .await?;

    Ok(ApiResponse::created(note, "Note created successfully"))
}

/// GET /api/v1/notes/get-notes - current user's notes, most recent first
pub async fn get_notes(Extension(current_user): Extension<UserPublic>) -> ApiResult<Vec<Note>> {
    let pool = DatabaseManager::pool().await?;
    let notes = notes::list_for_user(pool, current_user.id).await?;
    Ok(ApiResponse::ok(notes, "Notes fetched successfully"))
}

/// GET /api/v1/notes/get-note-by-id/:id
pub async fn get_note_by_id(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let note = notes::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    policy::require_owner_or_admin(note.user_id, &current_user)?;

    Ok(ApiResponse::ok(note, "Note fetched successfully"))
}

/// PATCH /api/v1/notes/update-note/:id
pub async fn update_note(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
    Body(update): Body<NoteUpdate>,
) -> ApiResult<Note> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let note = notes::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    policy::require_owner_or_admin(note.user_id, &current_user)?;

    if update.is_empty() {
        return Ok(ApiResponse::ok(note, "No updatable fields provided"));
    }

    let updated = notes::update(pool, id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(ApiResponse::ok(updated, "Note updated successfully"))
}

/// DELETE /api/v1/notes/delete-note/:id
pub async fn delete_note(
    Extension(current_user): Extension<UserPublic>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let note = notes::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    policy::require_owner_or_admin(note.user_id, &current_user)?;

    notes::delete(pool, id).await?;
    Ok(ApiResponse::ok(json!({}), "Note deleted successfully"))
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteSearchQuery {
    pub q: Option<String>,
    pub tag: Option<NoteTag>,
}

/// GET /api/v1/notes/search - always scoped to the current user
pub async fn search_notes(
    Extension(current_user): Extension<UserPublic>,
    Query(query): Query<NoteSearchQuery>,
) -> ApiResult<Vec<Note>> {
    let pool = DatabaseManager::pool().await?;
    let results = notes::search(
        pool,
        current_user.id,
        &NoteSearch {
            q: query.q,
            tag: query.tag,
        },
    )
    .await?;

    Ok(ApiResponse::ok(results, "Search results"))
}
