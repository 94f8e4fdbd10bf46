//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MentorHub API",
        version = "0.3.2",
        description = "Mentorship lifecycle and session scheduling: mentorship requests, relationships, scheduled calls with lazy auto-completion, and per-relationship collaboration resources.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Startups
        crate::routes::startups::create_startup,
        crate::routes::startups::list_startups,
        crate::routes::startups::get_startup,
        // Requests
        crate::routes::requests::create_request,
        crate::routes::requests::list_requests,
        crate::routes::requests::get_request,
        crate::routes::requests::accept_request,
        crate::routes::requests::decline_request,
        // Relationships
        crate::routes::relationships::list_relationships,
        crate::routes::relationships::get_relationship,
        // Scheduled calls
        crate::routes::calls::propose_call,
        crate::routes::calls::list_calls,
        crate::routes::calls::confirm_call,
        crate::routes::calls::decline_call,
        // Collaboration resources
        crate::routes::notes::list_notes,
        crate::routes::notes::create_note,
        crate::routes::notes::update_note,
        crate::routes::files::list_files,
        crate::routes::files::register_file,
        crate::routes::messages::list_messages,
        crate::routes::messages::send_message,
    ),
    components(schemas(
        // State record types
        crate::state::StartupRecord,
        crate::state::RequestRecord,
        crate::state::RelationshipRecord,
        crate::state::RelationshipStatus,
        crate::state::CallRecord,
        crate::state::NoteRecord,
        crate::state::FileRecord,
        crate::state::MessageRecord,
        // Request/response DTOs
        crate::routes::startups::CreateStartupRequest,
        crate::routes::requests::CreateRequestRequest,
        crate::routes::requests::RespondRequestRequest,
        crate::routes::requests::AcceptResponse,
        crate::routes::requests::DeclineResponse,
        crate::routes::calls::ProposeCallRequest,
        crate::routes::calls::ScheduledCallsResponse,
        crate::routes::notes::CreateNoteRequest,
        crate::routes::notes::UpdateNoteRequest,
        crate::routes::files::RegisterFileRequest,
        crate::routes::messages::SendMessageRequest,
        // Errors
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "startups", description = "Startup directory"),
        (name = "requests", description = "Mentorship request lifecycle"),
        (name = "relationships", description = "Active mentorship relationships"),
        (name = "scheduled-calls", description = "Call proposal, confirmation, and completion"),
        (name = "notes", description = "Session notes"),
        (name = "files", description = "Shared file metadata"),
        (name = "messages", description = "Relationship chat"),
    )
)]
pub struct ApiDoc;

/// Router serving the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
