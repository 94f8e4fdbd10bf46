//! # Identity & Access Guard
//!
//! Bearer token middleware resolving an inbound request to exactly one
//! authenticated actor.
//!
//! ## Token Format
//!
//! Two independent credential schemes share the `Authorization: Bearer`
//! header — a mentor session and a generic user session:
//!
//! ```text
//! Bearer mentor:{actor_uuid}:{secret}
//! Bearer user:{actor_uuid}:{secret}
//! ```
//!
//! Resolution tries the mentor scheme first, then the user scheme, in
//! that fixed order. Whichever matches, the middleware injects one
//! unified [`ActorIdentity`] into request extensions — downstream
//! handlers never branch on which scheme resolved. The same
//! collaboration endpoints serve both actor roles; this guard is what
//! hides that asymmetry from everything behind it.
//!
//! When no `AUTH_TOKEN` is configured (dev/test mode) the `{secret}`
//! segment is optional and unchecked, but a scheme and actor id are
//! still required: every operation downstream needs a resolved actor.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── SessionKind ─────────────────────────────────────────────────────────────

/// Which credential scheme resolved the actor.
///
/// Carried for logging only. Authorization decisions are made from the
/// actor's relationship to the record in question, never from the
/// session kind — a mentor session and a user session with the same id
/// are the same actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Resolved from the mentor session scheme.
    Mentor,
    /// Resolved from the generic user session scheme.
    User,
}

impl SessionKind {
    /// Return the string representation of this session kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::User => "user",
        }
    }
}

// ── ActorIdentity ───────────────────────────────────────────────────────────

/// Identity of the authenticated actor, extracted from the auth context
/// and available to all route handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorIdentity {
    /// The actor's id, uniform regardless of which scheme resolved.
    pub id: Uuid,
    /// Which credential scheme matched (logging only).
    pub session: SessionKind,
}

/// Extracts the identity that the auth middleware injected into
/// extensions. Returns 401 if no identity is present (middleware didn't
/// run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for ActorIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no actor identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential leakage
/// in logs.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared session secret. `None` disables secret verification
    /// (dev/test mode) — actor resolution still runs.
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Resolution ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// Prevents timing side-channels that could reveal secret length or
/// prefix. When lengths differ, performs a dummy comparison to avoid
/// leaking length information through timing variance.
fn constant_time_secret_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Attempt to resolve one credential scheme from the raw bearer value.
///
/// Scheme shape: `{kind}:{uuid}[:{secret}]`. Returns `None` when the
/// value does not name this scheme at all (so the caller can fall
/// through to the next scheme), `Some(Err)` when it names the scheme
/// but carries bad credentials.
fn try_scheme(
    provided: &str,
    kind: SessionKind,
    expected_secret: Option<&str>,
) -> Option<Result<ActorIdentity, String>> {
    let rest = provided.strip_prefix(kind.as_str())?.strip_prefix(':')?;

    let (actor_str, secret) = match rest.split_once(':') {
        Some((actor, secret)) => (actor, Some(secret)),
        None => (rest, None),
    };

    let id = match actor_str.parse::<Uuid>() {
        Ok(id) => id,
        Err(e) => return Some(Err(format!("invalid actor id: {e}"))),
    };

    if let Some(expected) = expected_secret {
        match secret {
            Some(secret) if constant_time_secret_eq(secret, expected) => {}
            Some(_) => return Some(Err("invalid session secret".into())),
            None => return Some(Err("missing session secret".into())),
        }
    }

    Some(Ok(ActorIdentity { id, session: kind }))
}

/// Resolve zero or one actor from the bearer value.
///
/// Tries the mentor session scheme first, then the generic user session
/// scheme, in that fixed order. A value that matches neither scheme
/// name resolves no actor.
pub fn resolve_actor(
    provided: &str,
    expected_secret: Option<&str>,
) -> Result<ActorIdentity, String> {
    for kind in [SessionKind::Mentor, SessionKind::User] {
        if let Some(result) = try_scheme(provided, kind, expected_secret) {
            return result;
        }
    }
    Err("token matches no credential scheme — expected mentor:{uuid}:{secret} or user:{uuid}:{secret}".into())
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Extract the Bearer token from the Authorization header and resolve
/// the actor.
///
/// On success the unified [`ActorIdentity`] is injected into request
/// extensions for downstream handlers. If neither credential scheme
/// resolves, the request is rejected with 401 and no further work is
/// performed.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();
    let expected_secret = config.as_ref().and_then(|c| c.token.as_deref());

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            let provided = &header_value[7..];
            match resolve_actor(provided, expected_secret) {
                Ok(identity) => {
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: unresolvable bearer token");
                    unauthorized_response(&msg)
                }
            }
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
