//! # Scheduled Call Lifecycle
//!
//! Calls are proposed inside an active mentorship relationship and move
//! through a strict partial order:
//!
//! ```text
//! PENDING ─confirm(counterparty)──▶ CONFIRMED
//! PENDING ─decline(counterparty)──▶ DECLINED
//! CONFIRMED ─time elapses─────────▶ COMPLETED   (automatic, no actor)
//! ```
//!
//! `DECLINED`, `CANCELLED`, and `COMPLETED` are terminal. `CANCELLED`
//! exists in the state set but no actor-driven route reaches it today.
//!
//! ## The Sweep
//!
//! `CONFIRMED → COMPLETED` is not an actor action. It happens lazily,
//! triggered by any read of a relationship's call list: every CONFIRMED
//! call whose `scheduled_at + duration` is strictly in the past is
//! transitioned before the list is returned. [`CallStatus::sweep`] is
//! the single place that rule lives — an eager scheduler, if one is
//! ever wanted, must call the same function rather than restate it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default call length in minutes when a proposal omits one.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Longest accepted call length in minutes (one full day).
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Lifecycle state of a scheduled call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    /// Proposed, awaiting the counterparty's confirmation or decline.
    #[serde(rename = "PENDING")]
    Pending,
    /// Confirmed by the counterparty; will auto-complete once elapsed.
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    /// Declined by the counterparty. Terminal.
    #[serde(rename = "DECLINED")]
    Declined,
    /// Cancelled. Terminal. In the state set but not reachable through
    /// any actor-driven transition in this core.
    #[serde(rename = "CANCELLED")]
    Cancelled,
    /// The scheduled window has fully elapsed after confirmation. Terminal.
    #[serde(rename = "COMPLETED")]
    Completed,
}

/// Errors from illegal call transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// An actor-driven transition was attempted from a non-PENDING state.
    #[error("call is {status}; only PENDING calls can be confirmed or declined")]
    NotPending {
        /// The status the call currently holds.
        status: CallStatus,
    },
    /// The proposer attempted to answer their own proposal.
    #[error("a call's proposer cannot confirm or decline their own proposal")]
    SelfResponse,
}

impl CallStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Declined => "DECLINED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Convert a canonical status name back to a `CallStatus`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "DECLINED" => Some(Self::Declined),
            "CANCELLED" => Some(Self::Cancelled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Cancelled | Self::Completed)
    }

    /// The set of valid target states from this state, actor-driven and
    /// time-driven combined.
    pub fn valid_transitions(&self) -> &'static [CallStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Declined],
            Self::Confirmed => &[Self::Completed],
            Self::Declined | Self::Cancelled | Self::Completed => &[],
        }
    }

    /// Rule on an actor-driven response (confirm or decline) from the
    /// counterparty to the proposer.
    ///
    /// `proposed_by` is the proposing actor, `responder` the actor
    /// attempting the transition. Self-responses are rejected before the
    /// status guard so a proposer poking a resolved call still learns
    /// the real reason their action is illegal.
    pub fn respond(
        self,
        proposed_by: Uuid,
        responder: Uuid,
        target: CallStatus,
    ) -> Result<CallStatus, CallError> {
        debug_assert!(matches!(target, Self::Confirmed | Self::Declined));
        if responder == proposed_by {
            return Err(CallError::SelfResponse);
        }
        match self {
            Self::Pending => Ok(target),
            status => Err(CallError::NotPending { status }),
        }
    }

    /// The time-driven sweep rule.
    ///
    /// Returns `Some(COMPLETED)` when this status is CONFIRMED and the
    /// scheduled window has strictly elapsed at `now`; `None` otherwise.
    /// Idempotent: sweeping a COMPLETED call yields `None`, so concurrent
    /// sweeps over the same call are no-ops after the first.
    pub fn sweep(
        self,
        scheduled_at: DateTime<Utc>,
        duration_minutes: i64,
        now: DateTime<Utc>,
    ) -> Option<CallStatus> {
        match self {
            Self::Confirmed if has_elapsed(scheduled_at, duration_minutes, now) => {
                Some(Self::Completed)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a call's scheduled window is strictly in the past at `now`.
///
/// A call in progress (`scheduled_at <= now <= scheduled_at + duration`)
/// has not elapsed. A duration or end time outside chrono's
/// representable range is treated as a window that never elapses.
pub fn has_elapsed(scheduled_at: DateTime<Utc>, duration_minutes: i64, now: DateTime<Utc>) -> bool {
    let Some(duration) = Duration::try_minutes(duration_minutes) else {
        return false;
    };
    match scheduled_at.checked_add_signed(duration) {
        Some(end) => end < now,
        None => false,
    }
}

/// Derive the deterministic meeting room URL for a relationship.
///
/// The URL is a pure function of the relationship id, so it can always
/// be recomputed without a lookup and both participants independently
/// derive the same room.
pub fn meeting_url(relationship_id: Uuid) -> String {
    format!("https://meet.jit.si/mentorhub-{relationship_id}")
}
