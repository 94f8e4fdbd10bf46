//! Mentorship relationship persistence operations.
//!
//! Relationship rows are only ever inserted by the request-accept
//! transaction in [`crate::db::requests::resolve`]; this module covers
//! startup hydration.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{RelationshipRecord, RelationshipStatus};

/// Load all relationships into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<RelationshipRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RelationshipRow>(
        "SELECT id, mentor_id, startup_id, startup_owner_id, status, start_date
         FROM mentorship_relationships ORDER BY start_date",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!("skipping relationship row with unknown status value");
            }
        }
    }
    Ok(records)
}

#[derive(sqlx::FromRow)]
struct RelationshipRow {
    id: Uuid,
    mentor_id: Uuid,
    startup_id: Uuid,
    startup_owner_id: Uuid,
    status: String,
    start_date: DateTime<Utc>,
}

impl RelationshipRow {
    fn into_record(self) -> Option<RelationshipRecord> {
        let status = match RelationshipStatus::from_name(&self.status) {
            Some(status) => status,
            None => {
                tracing::warn!(id = %self.id, status = %self.status, "unknown relationship status in database");
                return None;
            }
        };
        Some(RelationshipRecord {
            id: self.id,
            mentor_id: self.mentor_id,
            startup_id: self.startup_id,
            startup_owner_id: self.startup_owner_id,
            status,
            start_date: self.start_date,
        })
    }
}
