//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! In-memory stores are the read/write path; a PostgreSQL pool, when
//! configured, provides durable write-through and startup hydration.
//! Each record type mirrors one table. The relationship record is the
//! root of authorization for every collaboration resource — messages,
//! files, notes, and scheduled calls all carry a `relationship_id` and
//! are gated through it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mhub_state::{CallStatus, InitiatedBy, ParticipantRole, RequestStatus};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::notify::Notifier;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because we never hold the lock across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert a record only if no existing record matches `conflict`.
    ///
    /// The scan and the insert run under a single write lock, so two
    /// concurrent inserts cannot both pass the uniqueness check. Returns
    /// the conflicting record on failure.
    pub fn insert_unique(
        &self,
        id: Uuid,
        value: T,
        conflict: impl Fn(&T) -> bool,
    ) -> Result<(), T> {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values().find(|v| conflict(v)) {
            return Err(existing.clone());
        }
        guard.insert(id, value);
        Ok(())
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// List records matching a predicate.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Update a record in place. Returns the updated record, or `None`
    /// if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current
    /// state, validate preconditions, mutate the record, and return
    /// `Ok(R)` or `Err(E)`. The entire operation runs under a single
    /// write lock, eliminating TOCTOU races between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)`
    /// with the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Apply `f` to every record under one write lock, collecting the
    /// records `f` reports as changed (returns `true`).
    ///
    /// Used by the call-list sweep: the transition check and the write
    /// happen in the same critical section, so concurrent sweeps cannot
    /// double-transition a record.
    pub fn update_all(&self, mut f: impl FnMut(&mut T) -> bool) -> Vec<T> {
        let mut guard = self.data.write();
        let mut changed = Vec::new();
        for entry in guard.values_mut() {
            if f(entry) {
                changed.push(entry.clone());
            }
        }
        changed
    }

    /// Remove a record by ID.
    #[allow(dead_code)]
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// Minimal startup directory entry.
///
/// The marketplace's startup CRUD proper lives outside this core; this
/// record exists because the authorization envelope needs to resolve a
/// startup to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartupRecord {
    pub id: Uuid,
    /// The startup owner (innovator) — one of the two parties of any
    /// relationship involving this startup.
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A mentorship request: a proposal to begin mentoring, made by either
/// party, resolved exactly once to ACCEPTED or DECLINED.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestRecord {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub startup_id: Uuid,
    /// Which side created the request. Decides who may respond: the
    /// counterparty to the initiator.
    #[schema(value_type = String)]
    pub initiated_by: InitiatedBy,
    #[schema(value_type = String)]
    pub status: RequestStatus,
    pub message: String,
    /// The counterparty's response message, set on accept/decline.
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a mentorship relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RelationshipStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "ENDED")]
    Ended,
}

impl RelationshipStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
        }
    }

    /// Convert a canonical status name back to a `RelationshipStatus`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ACTIVE" => Some(Self::Active),
            "ENDED" => Some(Self::Ended),
            _ => None,
        }
    }
}

/// The durable mentor–startup pairing created when a request is
/// accepted. Root of authorization for all collaboration resources.
///
/// Never created directly by a client — only as the side effect of
/// request acceptance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelationshipRecord {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub startup_id: Uuid,
    /// The startup owner at acceptance time. Snapshotted here so the
    /// access gate needs no directory lookup.
    pub startup_owner_id: Uuid,
    pub status: RelationshipStatus,
    pub start_date: DateTime<Utc>,
}

impl RelationshipRecord {
    /// The collaboration resource gate: true iff the actor is one of
    /// the two parties of this relationship.
    ///
    /// Necessary and sufficient for reading/writing messages, files,
    /// and notes; note editing layers an author check on top.
    pub fn has_access(&self, actor_id: Uuid) -> bool {
        actor_id == self.mentor_id || actor_id == self.startup_owner_id
    }

    /// The role the actor holds in this relationship, if any.
    pub fn role_of(&self, actor_id: Uuid) -> Option<ParticipantRole> {
        if actor_id == self.mentor_id {
            Some(ParticipantRole::Mentor)
        } else if actor_id == self.startup_owner_id {
            Some(ParticipantRole::StartupOwner)
        } else {
            None
        }
    }

    /// The other party of the relationship relative to `actor_id`.
    pub fn counterparty_of(&self, actor_id: Uuid) -> Option<Uuid> {
        match self.role_of(actor_id)? {
            ParticipantRole::Mentor => Some(self.startup_owner_id),
            ParticipantRole::StartupOwner => Some(self.mentor_id),
        }
    }
}

/// A scheduled call within a relationship.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallRecord {
    pub id: Uuid,
    pub relationship_id: Uuid,
    /// The participant who proposed the call. Only the other
    /// participant may confirm or decline it.
    pub proposed_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    #[schema(value_type = String)]
    pub status: CallStatus,
    /// Deterministically derived from `relationship_id`; persisted for
    /// convenience but always recomputable.
    pub meeting_url: String,
    pub created_at: DateTime<Utc>,
}

/// A session note. Editable only by its author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct NoteRecord {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata for a file shared in a session. The blob itself lives in
/// the external storage service; this record holds its address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub uploader_id: Uuid,
    pub file_name: String,
    /// Opaque storage path or URL returned by the upload service.
    pub file_path: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// An append-only chat message within a relationship.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential
/// leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared session secret. If `None`, secret verification is
    /// disabled (dev/test mode).
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Clone)]
pub struct AppState {
    pub startups: Store<StartupRecord>,
    pub requests: Store<RequestRecord>,
    pub relationships: Store<RelationshipRecord>,
    pub calls: Store<CallRecord>,
    pub notes: Store<NoteRecord>,
    pub files: Store<FileRecord>,
    pub messages: Store<MessageRecord>,

    /// PostgreSQL connection pool for durable persistence. When `Some`,
    /// every mutation is written through and stores are hydrated on
    /// startup. When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    /// Best-effort lifecycle notifier. Failures are logged, never
    /// surfaced — the state transition is the source of truth and
    /// notification is advisory.
    pub notifier: Arc<dyn Notifier>,

    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("startups", &self.startups.len())
            .field("requests", &self.requests.len())
            .field("relationships", &self.relationships.len())
            .field("calls", &self.calls.len())
            .field("db_pool", &self.db_pool.as_ref().map(|_| "[connected]"))
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Create a new application state with default configuration, no
    /// database, and the tracing notifier.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            startups: Store::new(),
            requests: Store::new(),
            relationships: Store::new(),
            calls: Store::new(),
            notes: Store::new(),
            files: Store::new(),
            messages: Store::new(),
            db_pool,
            notifier: Arc::new(crate::notify::TracingNotifier),
            config,
        }
    }

    /// Replace the notifier provider.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available, so
    /// that read operations stay fast and synchronous afterwards.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let startups = crate::db::startups::load_all(pool)
            .await
            .map_err(|e| format!("failed to load startups: {e}"))?;
        let startup_count = startups.len();
        for record in startups {
            self.startups.insert(record.id, record);
        }

        let requests = crate::db::requests::load_all(pool)
            .await
            .map_err(|e| format!("failed to load requests: {e}"))?;
        let request_count = requests.len();
        for record in requests {
            self.requests.insert(record.id, record);
        }

        let relationships = crate::db::relationships::load_all(pool)
            .await
            .map_err(|e| format!("failed to load relationships: {e}"))?;
        let relationship_count = relationships.len();
        for record in relationships {
            self.relationships.insert(record.id, record);
        }

        let calls = crate::db::calls::load_all(pool)
            .await
            .map_err(|e| format!("failed to load scheduled calls: {e}"))?;
        let call_count = calls.len();
        for record in calls {
            self.calls.insert(record.id, record);
        }

        let (notes, files, messages) = crate::db::sessions::load_all(pool)
            .await
            .map_err(|e| format!("failed to load session resources: {e}"))?;
        let (note_count, file_count, message_count) = (notes.len(), files.len(), messages.len());
        for record in notes {
            self.notes.insert(record.id, record);
        }
        for record in files {
            self.files.insert(record.id, record);
        }
        for record in messages {
            self.messages.insert(record.id, record);
        }

        tracing::info!(
            startups = startup_count,
            requests = request_count,
            relationships = relationship_count,
            calls = call_count,
            notes = note_count,
            files = file_count,
            messages = message_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
