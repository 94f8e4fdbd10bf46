//! # Session Notes API
//!
//! Shared notes within a relationship. Both participants may read and
//! create notes; editing a note is reserved for its author, so the
//! other participant sees a stable record of what was written.
//!
//! ## Endpoints
//!
//! - `GET /v1/relationships/:id/notes` — list notes
//! - `POST /v1/relationships/:id/notes` — create a note
//! - `PUT /v1/relationships/:id/notes` — edit a note (author only)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::error::AppError;
use crate::routes::{parse_body, relationship_for_participant, Validate};
use crate::state::{AppState, NoteRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to create a note.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

impl Validate for CreateNoteRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to edit an existing note.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// The note being edited.
    pub note_id: Uuid,
    pub title: String,
    pub content: String,
}

impl Validate for UpdateNoteRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/relationships/:id/notes",
        get(list_notes).post(create_note).put(update_note),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/relationships/:id/notes — List a relationship's notes.
#[utoipa::path(
    get,
    path = "/v1/relationships/{id}/notes",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    responses(
        (status = 200, description = "Notes in creation order", body = Vec<NoteRecord>),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
    ),
    tag = "notes"
)]
async fn list_notes(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
) -> Result<Json<Vec<NoteRecord>>, AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;

    let mut notes = state.notes.filter(|n| n.relationship_id == relationship_id);
    notes.sort_by_key(|n| n.created_at);
    Ok(Json(notes))
}

/// POST /v1/relationships/:id/notes — Create a note.
#[utoipa::path(
    post,
    path = "/v1/relationships/{id}/notes",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteRecord),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "notes"
)]
async fn create_note(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteRecord>), AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;
    let req = parse_body(body)?;

    let now = Utc::now();
    let record = NoteRecord {
        id: Uuid::new_v4(),
        relationship_id,
        author_id: actor.id,
        title: req.title,
        content: req.content,
        created_at: now,
        updated_at: now,
    };

    state.notes.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::sessions::insert_note(pool, &record).await {
            state.notes.remove(&record.id);
            return Err(AppError::Internal(format!("failed to persist note: {e}")));
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /v1/relationships/:id/notes — Edit a note (author only).
#[utoipa::path(
    put,
    path = "/v1/relationships/{id}/notes",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteRecord),
        (status = 403, description = "Caller is not the note's author", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship or note not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "notes"
)]
async fn update_note(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteRecord>, AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;
    let req = parse_body(body)?;

    let note = state
        .notes
        .get(&req.note_id)
        .filter(|n| n.relationship_id == relationship_id)
        .ok_or_else(|| AppError::NotFound(format!("note {} not found", req.note_id)))?;

    if note.author_id != actor.id {
        return Err(AppError::Forbidden(
            "only the note's author may edit it".to_string(),
        ));
    }

    let updated = state
        .notes
        .update(&req.note_id, |note| {
            note.title = req.title.clone();
            note.content = req.content.clone();
            note.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("note {} not found", req.note_id)))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::sessions::update_note(pool, &updated).await {
            tracing::error!(note_id = %updated.id, error = %e, "failed to persist note edit");
        }
    }

    Ok(Json(updated))
}
