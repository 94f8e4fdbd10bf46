//! # mhub-state — MentorHub Lifecycle State Machines
//!
//! Pure domain logic for the mentorship marketplace, with no I/O:
//!
//! - [`request`] — the mentorship request lifecycle
//!   (`PENDING → ACCEPTED | DECLINED`) and the symmetric counterparty
//!   rule that decides which participant may respond.
//! - [`call`] — the scheduled call lifecycle
//!   (`PENDING → CONFIRMED | DECLINED`, `CONFIRMED → COMPLETED` by
//!   elapsed time) and the read-triggered sweep rule.
//!
//! ## Crate Policy
//!
//! Everything here is deterministic and synchronous. Time enters as an
//! explicit `DateTime<Utc>` argument, never via `Utc::now()`, so every
//! transition is testable at any point on the clock. The API layer owns
//! wall-clock reads, storage, and notification side effects.

pub mod call;
pub mod request;

pub use call::{
    meeting_url, CallError, CallStatus, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES,
};
pub use request::{can_respond, InitiatedBy, ParticipantRole, RequestError, RequestStatus};
