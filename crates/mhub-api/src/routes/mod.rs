//! # API Route Modules
//!
//! Route modules for the MentorHub API surface:
//!
//! - `startups` — minimal startup directory feeding owner resolution.
//! - `requests` — mentorship request lifecycle (create, list, accept,
//!   decline) with the symmetric counterparty rule.
//! - `relationships` — active mentorship relationship views.
//! - `calls` — scheduled call lifecycle: proposal, counterparty
//!   confirm/decline, and the lazy auto-completion sweep on list.
//! - `notes` — collaborative session notes (author-only edits).
//! - `files` — shared file metadata registration.
//! - `messages` — append-only relationship chat.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::auth::ActorIdentity;
use crate::error::AppError;
use crate::state::{AppState, RelationshipRecord};

/// Domain rules a request body must satisfy beyond deserializing.
///
/// Implemented by every mutating DTO in the route modules below.
pub trait Validate {
    /// Returns the rule that failed as a client-facing message.
    fn validate(&self) -> Result<(), String>;
}

/// Deserialize and validate a JSON request body.
///
/// A body that does not deserialize maps to `BAD_REQUEST`; one that
/// deserializes but breaks a domain rule maps to `VALIDATION_ERROR`.
/// Handlers call this after their resource gate, so an actor who may
/// not touch the resource never learns whether their body was valid.
pub fn parse_body<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(value) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

pub mod calls;
pub mod files;
pub mod messages;
pub mod notes;
pub mod relationships;
pub mod requests;
pub mod startups;

/// Load a relationship and verify the actor is one of its two
/// participants.
///
/// Every collaboration route runs this gate before touching any nested
/// resource. Ordering is fixed: an unknown relationship is 404
/// regardless of who asks, and a known relationship is 403 for anyone
/// who is neither the mentor nor the startup owner.
pub fn relationship_for_participant(
    state: &AppState,
    relationship_id: Uuid,
    actor: &ActorIdentity,
) -> Result<RelationshipRecord, AppError> {
    let relationship = state
        .relationships
        .get(&relationship_id)
        .ok_or_else(|| AppError::NotFound(format!("relationship {relationship_id} not found")))?;

    if !relationship.has_access(actor.id) {
        return Err(AppError::Forbidden(
            "only relationship participants may access this resource".to_string(),
        ));
    }

    Ok(relationship)
}
