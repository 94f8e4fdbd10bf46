//! # mhub-api — Axum API Services for MentorHub
//!
//! HTTP layer over the [`mhub_state`] lifecycle machines: mentorship
//! requests, relationships created by acceptance, scheduled calls with
//! lazy auto-completion, and the per-relationship collaboration
//! resources (messages, files, notes) behind the participant gate.
//!
//! ## API Surface
//!
//! | Prefix                          | Module                    | Domain              |
//! |---------------------------------|---------------------------|---------------------|
//! | `/v1/startups/*`                | [`routes::startups`]      | Startup directory   |
//! | `/v1/requests/*`                | [`routes::requests`]      | Request lifecycle   |
//! | `/v1/relationships/*`           | [`routes::relationships`] | Relationship views  |
//! | `/v1/relationships/:id/scheduled-calls` | [`routes::calls`] | Call scheduling     |
//! | `/v1/scheduled-calls/*`         | [`routes::calls`]         | Call responses      |
//! | `/v1/relationships/:id/notes`   | [`routes::notes`]         | Session notes       |
//! | `/v1/relationships/:id/files`   | [`routes::files`]         | Shared files        |
//! | `/v1/relationships/:id/messages`| [`routes::messages`]      | Relationship chat   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod db;
pub mod error;
pub mod notify;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::startups::router())
        .merge(routes::requests::router())
        .merge(routes::relationships::router())
        .merge(routes::calls::router())
        .merge(routes::notes::router())
        .merge(routes::files::router())
        .merge(routes::messages::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
