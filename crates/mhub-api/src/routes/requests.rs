//! # Mentorship Request Lifecycle API
//!
//! Requests move PENDING → ACCEPTED or PENDING → DECLINED exactly once,
//! and only the counterparty of the initiator may resolve them.
//! Acceptance creates the ACTIVE mentorship relationship in the same
//! critical section that flips the request status, so a request can
//! never be durably ACCEPTED without its relationship.
//!
//! ## Endpoints
//!
//! - `POST /v1/requests` — create a PENDING request
//! - `GET /v1/requests` — list requests the caller participates in
//! - `GET /v1/requests/:id` — get request (participants only)
//! - `POST /v1/requests/:id/accept` — counterparty accepts
//! - `POST /v1/requests/:id/decline` — counterparty declines

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use mhub_state::{can_respond, InitiatedBy, ParticipantRole, RequestStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::error::AppError;
use crate::notify::{dispatch, templates};
use crate::routes::{parse_body, Validate};
use crate::state::{
    AppState, RelationshipRecord, RelationshipStatus, RequestRecord, StartupRecord,
};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to open a mentorship request between a mentor and a startup.
///
/// The caller must be one of the two named parties; the initiating side
/// is derived from which party they are.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequestRequest {
    /// The mentor party.
    pub mentor_id: Uuid,
    /// The startup party.
    pub startup_id: Uuid,
    /// Introduction message shown to the counterparty.
    pub message: String,
}

impl Validate for CreateRequestRequest {
    fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        Ok(())
    }
}

/// Body for accept/decline. The response message is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RespondRequestRequest {
    /// Optional reply shown to the initiator.
    #[serde(default)]
    pub response: Option<String>,
}

impl Validate for RespondRequestRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Result of accepting a request: the resolved request and the newly
/// created relationship.
#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptResponse {
    pub request: RequestRecord,
    pub relationship: RelationshipRecord,
}

/// Result of declining a request.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeclineResponse {
    pub request: RequestRecord,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/requests", get(list_requests).post(create_request))
        .route("/v1/requests/:id", get(get_request))
        .route("/v1/requests/:id/accept", post(accept_request))
        .route("/v1/requests/:id/decline", post(decline_request))
}

// ── Authorization helpers ───────────────────────────────────────────

/// Which side of the request the actor sits on, if either.
///
/// The mentor side is the request's `mentor_id`; the startup side is
/// the current owner of the request's startup.
fn participant_role(
    state: &AppState,
    request: &RequestRecord,
    actor_id: Uuid,
) -> Option<ParticipantRole> {
    if actor_id == request.mentor_id {
        return Some(ParticipantRole::Mentor);
    }
    let startup = state.startups.get(&request.startup_id)?;
    if actor_id == startup.owner_id {
        return Some(ParticipantRole::StartupOwner);
    }
    None
}

/// Load the request and authorize the actor as the initiator's
/// counterparty. Shared by accept and decline so the two paths cannot
/// drift apart.
fn load_for_response(
    state: &AppState,
    request_id: Uuid,
    actor: &ActorIdentity,
) -> Result<(RequestRecord, StartupRecord), AppError> {
    let request = state
        .requests
        .get(&request_id)
        .ok_or_else(|| AppError::NotFound(format!("request {request_id} not found")))?;

    let role = participant_role(state, &request, actor.id).ok_or_else(|| {
        AppError::Forbidden("only request participants may respond to a request".to_string())
    })?;

    if !can_respond(request.initiated_by, role) {
        return Err(AppError::Forbidden(
            "only the counterparty of the initiator may respond to a request".to_string(),
        ));
    }

    let startup = state.startups.get(&request.startup_id).ok_or_else(|| {
        AppError::Internal(format!("startup {} missing for request", request.startup_id))
    })?;

    Ok((request, startup))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/requests — Create a PENDING mentorship request.
#[utoipa::path(
    post,
    path = "/v1/requests",
    request_body = CreateRequestRequest,
    responses(
        (status = 201, description = "Request created", body = RequestRecord),
        (status = 403, description = "Caller is neither named party", body = crate::error::ErrorBody),
        (status = 404, description = "Startup not found", body = crate::error::ErrorBody),
        (status = 409, description = "Pending request or active relationship already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
async fn create_request(
    State(state): State<AppState>,
    actor: ActorIdentity,
    body: Result<Json<CreateRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RequestRecord>), AppError> {
    // The parties live in the body, so parsing has to come before the
    // existence and authorization checks here.
    let req = parse_body(body)?;

    let startup = state
        .startups
        .get(&req.startup_id)
        .ok_or_else(|| AppError::NotFound(format!("startup {} not found", req.startup_id)))?;

    let initiated_by = if actor.id == req.mentor_id {
        InitiatedBy::Mentor
    } else if actor.id == startup.owner_id {
        InitiatedBy::Startup
    } else {
        return Err(AppError::Forbidden(
            "requests may only be created by the named mentor or the startup owner".to_string(),
        ));
    };

    let active_exists = !state
        .relationships
        .filter(|r| {
            r.mentor_id == req.mentor_id
                && r.startup_id == req.startup_id
                && r.status == RelationshipStatus::Active
        })
        .is_empty();
    if active_exists {
        return Err(AppError::Conflict(
            "an active relationship already exists for this mentor and startup".to_string(),
        ));
    }

    let record = RequestRecord {
        id: Uuid::new_v4(),
        mentor_id: req.mentor_id,
        startup_id: req.startup_id,
        initiated_by,
        status: RequestStatus::Pending,
        message: req.message,
        response: None,
        created_at: Utc::now(),
    };

    state
        .requests
        .insert_unique(record.id, record.clone(), |existing| {
            existing.mentor_id == record.mentor_id
                && existing.startup_id == record.startup_id
                && existing.status == RequestStatus::Pending
        })
        .map_err(|_| {
            AppError::Conflict(
                "a pending request already exists for this mentor and startup".to_string(),
            )
        })?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::requests::insert(pool, &record).await {
            state.requests.remove(&record.id);
            return Err(AppError::Internal(format!("failed to persist request: {e}")));
        }
    }

    let recipient = match initiated_by {
        InitiatedBy::Mentor => startup.owner_id,
        InitiatedBy::Startup => record.mentor_id,
    };
    dispatch(
        &state,
        templates::request_created(recipient, &startup.name, &record.message),
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/requests — List requests the caller participates in.
#[utoipa::path(
    get,
    path = "/v1/requests",
    responses(
        (status = 200, description = "Requests where the caller is a party", body = Vec<RequestRecord>),
    ),
    tag = "requests"
)]
async fn list_requests(
    State(state): State<AppState>,
    actor: ActorIdentity,
) -> Json<Vec<RequestRecord>> {
    let owned: Vec<Uuid> = state
        .startups
        .filter(|s| s.owner_id == actor.id)
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut requests = state
        .requests
        .filter(|r| r.mentor_id == actor.id || owned.contains(&r.startup_id));
    requests.sort_by_key(|r| r.created_at);
    Json(requests)
}

/// GET /v1/requests/:id — Get a single request (participants only).
#[utoipa::path(
    get,
    path = "/v1/requests/{id}",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = RequestRecord),
        (status = 403, description = "Caller is not a party", body = crate::error::ErrorBody),
        (status = 404, description = "Request not found", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
async fn get_request(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestRecord>, AppError> {
    let request = state
        .requests
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))?;

    if participant_role(&state, &request, actor.id).is_none() {
        return Err(AppError::Forbidden(
            "only request participants may view a request".to_string(),
        ));
    }

    Ok(Json(request))
}

/// POST /v1/requests/:id/accept — Accept a pending request.
///
/// The status flip runs inside a single store critical section, so of
/// two competing accepts exactly one wins; the loser observes a
/// non-PENDING status and gets 409. The winner creates the ACTIVE
/// relationship, snapshotting the startup's owner at acceptance time.
#[utoipa::path(
    post,
    path = "/v1/requests/{id}/accept",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = RespondRequestRequest,
    responses(
        (status = 200, description = "Request accepted, relationship created", body = AcceptResponse),
        (status = 403, description = "Caller may not respond", body = crate::error::ErrorBody),
        (status = 404, description = "Request not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request is not pending, or the pair already has an active relationship", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
async fn accept_request(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<RespondRequestRequest>, JsonRejection>,
) -> Result<Json<AcceptResponse>, AppError> {
    let (_, startup) = load_for_response(&state, id, &actor)?;
    let req = parse_body(body)?;

    let response_message = req.response.clone();
    let updated = state
        .requests
        .try_update(&id, |request| {
            let next = request.status.respond(RequestStatus::Accepted)?;
            request.status = next;
            request.response = response_message.clone();
            Ok::<RequestRecord, mhub_state::RequestError>(request.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))??;

    let relationship = RelationshipRecord {
        id: Uuid::new_v4(),
        mentor_id: updated.mentor_id,
        startup_id: updated.startup_id,
        startup_owner_id: startup.owner_id,
        status: RelationshipStatus::Active,
        start_date: Utc::now(),
    };
    // A sibling request for the same pair may have been accepted since
    // this one was created. The insert and the uniqueness scan share
    // one lock, so at most one accept per pair lands an ACTIVE
    // relationship; the loser reverts its status flip.
    if state
        .relationships
        .insert_unique(relationship.id, relationship.clone(), |existing| {
            existing.mentor_id == relationship.mentor_id
                && existing.startup_id == relationship.startup_id
                && existing.status == RelationshipStatus::Active
        })
        .is_err()
    {
        state.requests.update(&id, |request| {
            request.status = RequestStatus::Pending;
            request.response = None;
        });
        return Err(AppError::Conflict(
            "an active relationship already exists for this mentor and startup".to_string(),
        ));
    }

    if let Some(pool) = &state.db_pool {
        match crate::db::requests::resolve(pool, &updated, Some(&relationship)).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    request_id = %updated.id,
                    "request already resolved in database; in-memory and durable state diverged"
                );
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "failed to persist request resolution: {e}"
                )));
            }
        }
    }

    let initiator = match updated.initiated_by {
        InitiatedBy::Mentor => updated.mentor_id,
        InitiatedBy::Startup => startup.owner_id,
    };
    dispatch(
        &state,
        templates::request_accepted(initiator, &startup.name, updated.response.as_deref()),
    );

    Ok(Json(AcceptResponse {
        request: updated,
        relationship,
    }))
}

/// POST /v1/requests/:id/decline — Decline a pending request.
#[utoipa::path(
    post,
    path = "/v1/requests/{id}/decline",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = RespondRequestRequest,
    responses(
        (status = 200, description = "Request declined", body = DeclineResponse),
        (status = 403, description = "Caller may not respond", body = crate::error::ErrorBody),
        (status = 404, description = "Request not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request is not pending", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
async fn decline_request(
    State(state): State<AppState>,
    actor: ActorIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<RespondRequestRequest>, JsonRejection>,
) -> Result<Json<DeclineResponse>, AppError> {
    let (_, startup) = load_for_response(&state, id, &actor)?;
    let req = parse_body(body)?;

    let response_message = req.response.clone();
    let updated = state
        .requests
        .try_update(&id, |request| {
            let next = request.status.respond(RequestStatus::Declined)?;
            request.status = next;
            request.response = response_message.clone();
            Ok::<RequestRecord, mhub_state::RequestError>(request.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))??;

    if let Some(pool) = &state.db_pool {
        match crate::db::requests::resolve(pool, &updated, None).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    request_id = %updated.id,
                    "request already resolved in database; in-memory and durable state diverged"
                );
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "failed to persist request resolution: {e}"
                )));
            }
        }
    }

    let initiator = match updated.initiated_by {
        InitiatedBy::Mentor => updated.mentor_id,
        InitiatedBy::Startup => startup.owner_id,
    };
    dispatch(
        &state,
        templates::request_declined(initiator, &startup.name, updated.response.as_deref()),
    );

    Ok(Json(DeclineResponse { request: updated }))
}
