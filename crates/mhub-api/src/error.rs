//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from mhub-state to HTTP status codes and returns
//! JSON error bodies with a machine-readable code and a human-readable
//! message. Internal error details are never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mhub_state::{CallError, RequestError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// One variant per row of the error taxonomy. Notification failures are
/// deliberately absent: the notifier is advisory, its failures are
/// logged and swallowed at the dispatch site and never become an HTTP
/// error.
#[derive(Error, Debug)]
pub enum AppError {
    /// No resolvable actor — missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The resolved actor lacks the specific capability: wrong
    /// counterparty, not a relationship participant, or not a note's
    /// author (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced request/relationship/call/note does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed — missing or malformed field (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422).
    ///
    /// Normalized with `Validation`: the client sent syntactically valid
    /// HTTP but semantically invalid content, so both map to 422 and
    /// only malformed HTTP framing is 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Attempted transition from a non-source state, e.g. accepting a
    /// non-PENDING request (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Illegal request transitions surface as 409 Conflict — the caller
/// addressed a real request in the wrong state.
impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        Self::Conflict(err.to_string())
    }
}

/// Illegal call transitions split: a self-response is an authorization
/// failure (403), a wrong-state response is a state conflict (409).
impl From<CallError> for AppError {
    fn from(err: CallError) -> Self {
        match &err {
            CallError::SelfResponse => Self::Forbidden(err.to_string()),
            CallError::NotPending { .. } => Self::Conflict(err.to_string()),
        }
    }
}
