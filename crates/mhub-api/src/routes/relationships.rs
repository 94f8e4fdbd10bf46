//! # Mentorship Relationship API
//!
//! Read-only views over relationships created by request acceptance.
//!
//! ## Endpoints
//!
//! - `GET /v1/relationships` — list the caller's relationships
//! - `GET /v1/relationships/:id` — get relationship (participants only)

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::error::AppError;
use crate::routes::relationship_for_participant;
use crate::state::{AppState, RelationshipRecord};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/relationships", get(list_relationships))
        .route("/v1/relationships/:id", get(get_relationship))
}

/// GET /v1/relationships — List relationships the caller participates in.
#[utoipa::path(
    get,
    path = "/v1/relationships",
    responses(
        (status = 200, description = "Relationships where the caller is a participant", body = Vec<RelationshipRecord>),
    ),
    tag = "relationships"
)]
async fn list_relationships(
    State(state): State<AppState>,
    actor: ActorIdentity,
) -> Json<Vec<RelationshipRecord>> {
    let mut relationships = state.relationships.filter(|r| r.has_access(actor.id));
    relationships.sort_by_key(|r| r.start_date);
    Json(relationships)
}

/// GET /v1/relationships/:id — Get a single relationship (participants only).
#[utoipa::path(
    get,
    path = "/v1/relationships/{id}",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    responses(
        (status = 200, description = "Relationship found", body = RelationshipRecord),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
    ),
    tag = "relationships"
)]
async fn get_relationship(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RelationshipRecord>, AppError> {
    let relationship = relationship_for_participant(&state, id, &actor)?;
    Ok(Json(relationship))
}
