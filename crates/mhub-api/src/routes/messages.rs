//! # Relationship Messages API
//!
//! Append-only chat between the two participants of a relationship.
//! Messages are never edited or deleted.
//!
//! ## Endpoints
//!
//! - `GET /v1/relationships/:id/messages` — list messages
//! - `POST /v1/relationships/:id/messages` — send a message

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
use crate::state::{AppState, MessageRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to send a message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/relationships/:id/messages",
        get(list_messages).post(send_message),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/relationships/:id/messages — List messages.
#[utoipa::path(
    get,
    path = "/v1/relationships/{id}/messages",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    responses(
        (status = 200, description = "Messages in send order", body = Vec<MessageRecord>),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
    ),
    tag = "messages"
)]
async fn list_messages(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
) -> Result<Json<Vec<MessageRecord>>, AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;

    let mut messages = state
        .messages
        .filter(|m| m.relationship_id == relationship_id);
    messages.sort_by_key(|m| m.created_at);
    Ok(Json(messages))
}

/// POST /v1/relationships/:id/messages — Send a message.
#[utoipa::path(
    post,
    path = "/v1/relationships/{id}/messages",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageRecord),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "messages"
)]
async fn send_message(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageRecord>), AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;
    let req = parse_body(body)?;

    let record = MessageRecord {
        id: Uuid::new_v4(),
        relationship_id,
        sender_id: actor.id,
        content: req.content,
        created_at: Utc::now(),
    };

    state.messages.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::sessions::insert_message(pool, &record).await {
            state.messages.remove(&record.id);
            return Err(AppError::Internal(format!("failed to persist message: {e}")));
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}
