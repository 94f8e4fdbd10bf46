//! # Shared Files API
//!
//! Metadata registration for files shared within a relationship. The
//! blob itself lives in the external storage service; this API records
//! who shared what, where it landed, and how big it is.
//!
//! ## Endpoints
//!
//! - `GET /v1/relationships/:id/files` — list shared file metadata
//! - `POST /v1/relationships/:id/files` — register a shared file

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
use crate::state::{AppState, FileRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to register an externally stored file.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterFileRequest {
    /// Original file name.
    pub file_name: String,
    /// Storage path or URL returned by the upload service.
    pub file_path: String,
    /// Size of the stored blob in bytes.
    pub size_bytes: i64,
}

impl Validate for RegisterFileRequest {
    fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("file_name must not be empty".to_string());
        }
        if self.file_path.trim().is_empty() {
            return Err("file_path must not be empty".to_string());
        }
        if self.size_bytes < 0 {
            return Err("size_bytes must not be negative".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/relationships/:id/files",
        get(list_files).post(register_file),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/relationships/:id/files — List shared file metadata.
#[utoipa::path(
    get,
    path = "/v1/relationships/{id}/files",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    responses(
        (status = 200, description = "Files in share order", body = Vec<FileRecord>),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
    ),
    tag = "files"
)]
async fn list_files(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;

    let mut files = state.files.filter(|f| f.relationship_id == relationship_id);
    files.sort_by_key(|f| f.created_at);
    Ok(Json(files))
}

/// POST /v1/relationships/:id/files — Register a shared file.
#[utoipa::path(
    post,
    path = "/v1/relationships/{id}/files",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    request_body = RegisterFileRequest,
    responses(
        (status = 201, description = "File metadata registered", body = FileRecord),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "files"
)]
async fn register_file(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
    body: Result<Json<RegisterFileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileRecord>), AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;
    let req = parse_body(body)?;

    let record = FileRecord {
        id: Uuid::new_v4(),
        relationship_id,
        uploader_id: actor.id,
        file_name: req.file_name,
        file_path: req.file_path,
        size_bytes: req.size_bytes,
        created_at: Utc::now(),
    };

    state.files.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::sessions::insert_file(pool, &record).await {
            state.files.remove(&record.id);
            return Err(AppError::Internal(format!(
                "failed to persist file metadata: {e}"
            )));
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}
