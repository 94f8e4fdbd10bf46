//! Mentorship request persistence operations.
//!
//! The accept path is the one place in the system where two writes must
//! be one fact: a request must never be durably ACCEPTED without its
//! relationship, nor the reverse. [`resolve`] therefore runs the
//! conditional status update and the relationship insert inside a
//! single transaction.

use chrono::{DateTime, Utc};
use mhub_state::{InitiatedBy, RequestStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{RelationshipRecord, RequestRecord};

/// Insert a new mentorship request.
pub async fn insert(pool: &PgPool, record: &RequestRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO mentorship_requests
         (id, mentor_id, startup_id, initiated_by, status, message, response, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.mentor_id)
    .bind(record.startup_id)
    .bind(record.initiated_by.as_str())
    .bind(record.status.as_str())
    .bind(&record.message)
    .bind(&record.response)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Durably resolve a request to ACCEPTED or DECLINED, creating the
/// relationship in the same transaction when one is given.
///
/// The status write is conditional on the row still being PENDING, so
/// the database enforces the same single-winner rule as the in-memory
/// store. Returns `false` (after rollback) when the guard failed —
/// the caller logs that as a divergence, since the in-memory transition
/// already won its own race before write-through was attempted.
pub async fn resolve(
    pool: &PgPool,
    request: &RequestRecord,
    relationship: Option<&RelationshipRecord>,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE mentorship_requests
         SET status = $1, response = $2
         WHERE id = $3 AND status = 'PENDING'",
    )
    .bind(request.status.as_str())
    .bind(&request.response)
    .bind(request.id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    if let Some(rel) = relationship {
        sqlx::query(
            "INSERT INTO mentorship_relationships
             (id, mentor_id, startup_id, startup_owner_id, status, start_date)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(rel.id)
        .bind(rel.mentor_id)
        .bind(rel.startup_id)
        .bind(rel.startup_owner_id)
        .bind(rel.status.as_str())
        .bind(rel.start_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Load all requests into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<RequestRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RequestRow>(
        "SELECT id, mentor_id, startup_id, initiated_by, status, message, response, created_at
         FROM mentorship_requests ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!("skipping mentorship request row with unknown enum value");
            }
        }
    }
    Ok(records)
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    mentor_id: Uuid,
    startup_id: Uuid,
    initiated_by: String,
    status: String,
    message: String,
    response: Option<String>,
    created_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_record(self) -> Option<RequestRecord> {
        let initiated_by = match self.initiated_by.as_str() {
            "MENTOR" => InitiatedBy::Mentor,
            "STARTUP" => InitiatedBy::Startup,
            other => {
                tracing::warn!(id = %self.id, initiated_by = other, "unknown initiator in database");
                return None;
            }
        };
        let status = match RequestStatus::from_name(&self.status) {
            Some(status) => status,
            None => {
                tracing::warn!(id = %self.id, status = %self.status, "unknown request status in database");
                return None;
            }
        };
        Some(RequestRecord {
            id: self.id,
            mentor_id: self.mentor_id,
            startup_id: self.startup_id,
            initiated_by,
            status,
            message: self.message,
            response: self.response,
            created_at: self.created_at,
        })
    }
}
