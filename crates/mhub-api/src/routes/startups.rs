//! # Startup Directory API
//!
//! Minimal startup records backing owner resolution for the request and
//! relationship flows. Profile management beyond a name is out of
//! scope.
//!
//! ## Endpoints
//!
//! - `POST /v1/startups` — register a startup owned by the caller
//! - `GET /v1/startups` — list startups
//! - `GET /v1/startups/:id` — get startup

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
use crate::routes::{parse_body, Validate};
use crate::state::{AppState, StartupRecord};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a startup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStartupRequest {
    /// Display name of the startup.
    pub name: String,
}

impl Validate for CreateStartupRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/startups", get(list_startups).post(create_startup))
        .route("/v1/startups/:id", get(get_startup))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/startups — Register a startup owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/startups",
    request_body = CreateStartupRequest,
    responses(
        (status = 201, description = "Startup registered", body = StartupRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "startups"
)]
async fn create_startup(
    State(state): State<AppState>,
    actor: ActorIdentity,
    body: Result<Json<CreateStartupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartupRecord>), AppError> {
    let req = parse_body(body)?;
    let record = StartupRecord {
        id: Uuid::new_v4(),
        owner_id: actor.id,
        name: req.name,
        created_at: Utc::now(),
    };

    if let Some(pool) = &state.db_pool {
        crate::db::startups::insert(pool, &record)
            .await
            .map_err(|e| AppError::Internal(format!("failed to persist startup: {e}")))?;
    }

    state.startups.insert(record.id, record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/startups — List all startups.
#[utoipa::path(
    get,
    path = "/v1/startups",
    responses(
        (status = 200, description = "List of startups", body = Vec<StartupRecord>),
    ),
    tag = "startups"
)]
async fn list_startups(State(state): State<AppState>) -> Json<Vec<StartupRecord>> {
    let mut startups = state.startups.list();
    startups.sort_by_key(|s| s.created_at);
    Json(startups)
}

/// GET /v1/startups/:id — Get a single startup.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}",
    params(("id" = Uuid, Path, description = "Startup ID")),
    responses(
        (status = 200, description = "Startup found", body = StartupRecord),
        (status = 404, description = "Startup not found", body = crate::error::ErrorBody),
    ),
    tag = "startups"
)]
async fn get_startup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StartupRecord>, AppError> {
    state
        .startups
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("startup {id} not found")))
}
