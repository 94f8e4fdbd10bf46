//! Scheduled call persistence operations.

use chrono::{DateTime, Utc};
use mhub_state::CallStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::CallRecord;

/// Insert a newly proposed call.
pub async fn insert(pool: &PgPool, record: &CallRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO scheduled_calls
         (id, relationship_id, proposed_by, title, description, scheduled_at,
          duration_minutes, status, meeting_url, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(record.id)
    .bind(record.relationship_id)
    .bind(record.proposed_by)
    .bind(&record.title)
    .bind(&record.description)
    .bind(record.scheduled_at)
    .bind(record.duration_minutes)
    .bind(record.status.as_str())
    .bind(&record.meeting_url)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Move a call from one status to another, conditional on the row still
/// holding the expected prior status. Confirm, decline, and the lazy
/// completion sweep all write through this so the database applies the
/// same single-winner guard as the in-memory store.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    from: CallStatus,
    to: CallStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE scheduled_calls SET status = $1 WHERE id = $2 AND status = $3")
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all calls into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<CallRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CallRow>(
        "SELECT id, relationship_id, proposed_by, title, description, scheduled_at,
                duration_minutes, status, meeting_url, created_at
         FROM scheduled_calls ORDER BY scheduled_at",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!("skipping scheduled call row with unknown status value");
            }
        }
    }
    Ok(records)
}

#[derive(sqlx::FromRow)]
struct CallRow {
    id: Uuid,
    relationship_id: Uuid,
    proposed_by: Uuid,
    title: String,
    description: Option<String>,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i64,
    status: String,
    meeting_url: String,
    created_at: DateTime<Utc>,
}

impl CallRow {
    fn into_record(self) -> Option<CallRecord> {
        let status = match CallStatus::from_name(&self.status) {
            Some(status) => status,
            None => {
                tracing::warn!(id = %self.id, status = %self.status, "unknown call status in database");
                return None;
            }
        };
        Some(CallRecord {
            id: self.id,
            relationship_id: self.relationship_id,
            proposed_by: self.proposed_by,
            title: self.title,
            description: self.description,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            status,
            meeting_url: self.meeting_url,
            created_at: self.created_at,
        })
    }
}
