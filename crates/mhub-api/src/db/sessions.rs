//! Persistence for per-relationship session resources: notes, shared
//! file metadata, and chat messages.

use sqlx::PgPool;

use crate::state::{FileRecord, MessageRecord, NoteRecord};

/// Insert a new session note.
pub async fn insert_note(pool: &PgPool, record: &NoteRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO session_notes
         (id, relationship_id, author_id, title, content, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(record.relationship_id)
    .bind(record.author_id)
    .bind(&record.title)
    .bind(&record.content)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Rewrite a note's title and content after an author edit.
pub async fn update_note(pool: &PgPool, record: &NoteRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE session_notes SET title = $1, content = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(&record.title)
    .bind(&record.content)
    .bind(record.updated_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert shared file metadata.
pub async fn insert_file(pool: &PgPool, record: &FileRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO session_files
         (id, relationship_id, uploader_id, file_name, file_path, size_bytes, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(record.relationship_id)
    .bind(record.uploader_id)
    .bind(&record.file_name)
    .bind(&record.file_path)
    .bind(record.size_bytes)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append a chat message.
pub async fn insert_message(pool: &PgPool, record: &MessageRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO session_messages
         (id, relationship_id, sender_id, content, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(record.id)
    .bind(record.relationship_id)
    .bind(record.sender_id)
    .bind(&record.content)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all session resources into the in-memory stores on startup.
pub async fn load_all(
    pool: &PgPool,
) -> Result<(Vec<NoteRecord>, Vec<FileRecord>, Vec<MessageRecord>), sqlx::Error> {
    let notes = sqlx::query_as::<_, NoteRecord>(
        "SELECT id, relationship_id, author_id, title, content, created_at, updated_at
         FROM session_notes ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let files = sqlx::query_as::<_, FileRecord>(
        "SELECT id, relationship_id, uploader_id, file_name, file_path, size_bytes, created_at
         FROM session_files ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let messages = sqlx::query_as::<_, MessageRecord>(
        "SELECT id, relationship_id, sender_id, content, created_at
         FROM session_messages ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok((notes, files, messages))
}
