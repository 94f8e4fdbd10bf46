//! Startup directory persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `startups` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::StartupRecord;

/// Insert a new startup record.
pub async fn insert(pool: &PgPool, record: &StartupRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO startups (id, owner_id, name, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(record.id)
    .bind(record.owner_id)
    .bind(&record.name)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all startups into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<StartupRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StartupRow>(
        "SELECT id, owner_id, name, created_at FROM startups ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(StartupRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct StartupRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl StartupRow {
    fn into_record(self) -> StartupRecord {
        StartupRecord {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}
