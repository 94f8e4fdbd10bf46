//! # Scheduled Call API
//!
//! Calls are proposed within a relationship, confirmed or declined by
//! the non-proposing participant, and completed lazily: listing a
//! relationship's calls first sweeps every CONFIRMED call whose
//! scheduled window has elapsed to COMPLETED, so a reader never sees a
//! stale CONFIRMED call for a meeting that is already over.
//!
//! ## Endpoints
//!
//! - `POST /v1/relationships/:id/scheduled-calls` — propose a call
//! - `GET /v1/relationships/:id/scheduled-calls` — sweep, then list
//! - `POST /v1/scheduled-calls/:id/confirm` — counterparty confirms
//! - `POST /v1/scheduled-calls/:id/decline` — counterparty declines

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use mhub_state::{meeting_url, CallStatus, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::error::AppError;
use crate::notify::{dispatch, templates};
use crate::routes::{parse_body, relationship_for_participant, Validate};
use crate::state::{AppState, CallRecord};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to propose a call within a relationship. Only the start
/// time is mandatory.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProposeCallRequest {
    /// Short title shown in listings and notifications.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional agenda or context.
    #[serde(default)]
    pub description: Option<String>,
    /// When the call starts.
    pub scheduled_at: DateTime<Utc>,
    /// Call length; defaults to 30 minutes when omitted. Capped at one
    /// day.
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

impl Validate for ProposeCallRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(minutes) = self.duration_minutes {
            if minutes <= 0 || minutes > MAX_DURATION_MINUTES {
                return Err(format!(
                    "duration_minutes must be between 1 and {MAX_DURATION_MINUTES}"
                ));
            }
        }
        Ok(())
    }
}

/// A relationship's calls, post-sweep, in chronological order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledCallsResponse {
    pub scheduled_calls: Vec<CallRecord>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/relationships/:id/scheduled-calls",
            get(list_calls).post(propose_call),
        )
        .route("/v1/scheduled-calls/:id/confirm", post(confirm_call))
        .route("/v1/scheduled-calls/:id/decline", post(decline_call))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/relationships/:id/scheduled-calls — Propose a call.
#[utoipa::path(
    post,
    path = "/v1/relationships/{id}/scheduled-calls",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    request_body = ProposeCallRequest,
    responses(
        (status = 201, description = "Call proposed", body = CallRecord),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "scheduled-calls"
)]
async fn propose_call(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
    body: Result<Json<ProposeCallRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CallRecord>), AppError> {
    let relationship = relationship_for_participant(&state, relationship_id, &actor)?;
    let req = parse_body(body)?;

    let record = CallRecord {
        id: Uuid::new_v4(),
        relationship_id,
        proposed_by: actor.id,
        title: req.title.unwrap_or_default(),
        description: req.description,
        scheduled_at: req.scheduled_at,
        duration_minutes: req.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        status: CallStatus::Pending,
        meeting_url: meeting_url(relationship_id),
        created_at: Utc::now(),
    };

    state.calls.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::calls::insert(pool, &record).await {
            state.calls.remove(&record.id);
            return Err(AppError::Internal(format!("failed to persist call: {e}")));
        }
    }

    if let Some(counterparty) = relationship.counterparty_of(actor.id) {
        dispatch(
            &state,
            templates::call_proposed(
                counterparty,
                &record.title,
                record.scheduled_at,
                record.duration_minutes,
            ),
        );
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/relationships/:id/scheduled-calls — Sweep, then list.
///
/// The sweep and the read are ordered so the response reflects the
/// post-sweep state; a CONFIRMED call whose window elapsed between two
/// reads surfaces as COMPLETED on the second.
#[utoipa::path(
    get,
    path = "/v1/relationships/{id}/scheduled-calls",
    params(("id" = Uuid, Path, description = "Relationship ID")),
    responses(
        (status = 200, description = "Calls in chronological order", body = ScheduledCallsResponse),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Relationship not found", body = crate::error::ErrorBody),
    ),
    tag = "scheduled-calls"
)]
async fn list_calls(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(relationship_id): Path<Uuid>,
) -> Result<Json<ScheduledCallsResponse>, AppError> {
    relationship_for_participant(&state, relationship_id, &actor)?;

    let now = Utc::now();
    let completed = state.calls.update_all(|call| {
        if call.relationship_id != relationship_id {
            return false;
        }
        match call
            .status
            .sweep(call.scheduled_at, call.duration_minutes, now)
        {
            Some(next) => {
                call.status = next;
                true
            }
            None => false,
        }
    });

    // Durable sweep is best-effort: a failed write-through is retried
    // by the next read, since the conditional UPDATE keys off the
    // database's own CONFIRMED status.
    if let Some(pool) = &state.db_pool {
        for call in &completed {
            match crate::db::calls::update_status(pool, call.id, CallStatus::Confirmed, call.status)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(call_id = %call.id, "call already completed in database");
                }
                Err(e) => {
                    tracing::error!(call_id = %call.id, error = %e, "failed to persist call completion");
                }
            }
        }
    }

    let mut calls = state.calls.filter(|c| c.relationship_id == relationship_id);
    calls.sort_by_key(|c| c.scheduled_at);
    Ok(Json(ScheduledCallsResponse {
        scheduled_calls: calls,
    }))
}

/// Load a call, gate the actor through its relationship, and apply an
/// actor-driven transition. Shared by confirm and decline.
async fn respond_to_call(
    state: &AppState,
    actor: &ActorIdentity,
    call_id: Uuid,
    target: CallStatus,
) -> Result<CallRecord, AppError> {
    let call = state
        .calls
        .get(&call_id)
        .ok_or_else(|| AppError::NotFound(format!("scheduled call {call_id} not found")))?;

    relationship_for_participant(state, call.relationship_id, actor)?;

    let actor_id = actor.id;
    let updated = state
        .calls
        .try_update(&call_id, |call| {
            let next = call.status.respond(call.proposed_by, actor_id, target)?;
            call.status = next;
            Ok::<CallRecord, mhub_state::CallError>(call.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("scheduled call {call_id} not found")))??;

    if let Some(pool) = &state.db_pool {
        match crate::db::calls::update_status(pool, call_id, CallStatus::Pending, target).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    call_id = %call_id,
                    "call already resolved in database; in-memory and durable state diverged"
                );
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "failed to persist call response: {e}"
                )));
            }
        }
    }

    Ok(updated)
}

/// POST /v1/scheduled-calls/:id/confirm — Confirm a pending call.
#[utoipa::path(
    post,
    path = "/v1/scheduled-calls/{id}/confirm",
    params(("id" = Uuid, Path, description = "Scheduled call ID")),
    responses(
        (status = 200, description = "Call confirmed", body = CallRecord),
        (status = 403, description = "Caller is the proposer or not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Call not found", body = crate::error::ErrorBody),
        (status = 409, description = "Call is not pending", body = crate::error::ErrorBody),
    ),
    tag = "scheduled-calls"
)]
async fn confirm_call(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CallRecord>, AppError> {
    let updated = respond_to_call(&state, &actor, id, CallStatus::Confirmed).await?;

    dispatch(
        &state,
        templates::call_confirmed(updated.proposed_by, &updated.title, &updated.meeting_url),
    );

    Ok(Json(updated))
}

/// POST /v1/scheduled-calls/:id/decline — Decline a pending call.
#[utoipa::path(
    post,
    path = "/v1/scheduled-calls/{id}/decline",
    params(("id" = Uuid, Path, description = "Scheduled call ID")),
    responses(
        (status = 200, description = "Call declined", body = CallRecord),
        (status = 403, description = "Caller is the proposer or not a participant", body = crate::error::ErrorBody),
        (status = 404, description = "Call not found", body = crate::error::ErrorBody),
        (status = 409, description = "Call is not pending", body = crate::error::ErrorBody),
    ),
    tag = "scheduled-calls"
)]
async fn decline_call(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CallRecord>, AppError> {
    let updated = respond_to_call(&state, &actor, id, CallStatus::Declined).await?;

    dispatch(
        &state,
        templates::call_declined(updated.proposed_by, &updated.title),
    );

    Ok(Json(updated))
}
