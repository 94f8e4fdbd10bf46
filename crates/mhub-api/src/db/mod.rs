//! # Database Persistence Layer
//!
//! Provides Postgres persistence for MentorHub state via SQLx.
//!
//! ## Architecture
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the
//! API persists startups, requests, relationships, scheduled calls, and
//! session resources to PostgreSQL. When absent, the API operates in
//! in-memory-only mode (suitable for development and testing).
//!
//! Guarded lifecycle transitions use conditional updates
//! (`UPDATE ... WHERE status = ...`) so the durable layer enforces the
//! same single-winner semantics as the in-memory stores, and request
//! acceptance couples the status write and the relationship insert in
//! one transaction.

pub mod calls;
pub mod relationships;
pub mod requests;
pub mod sessions;
pub mod startups;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
