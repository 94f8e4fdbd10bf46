//! # Mentorship Request Lifecycle
//!
//! A request is created `PENDING` by either side of a prospective
//! mentorship and is mutated exactly once:
//!
//! ```text
//! PENDING ─accept(counterparty)──▶ ACCEPTED
//! PENDING ─decline(counterparty)─▶ DECLINED
//! ```
//!
//! `ACCEPTED` and `DECLINED` are terminal. Acceptance is what brings a
//! mentorship relationship into existence — that side effect lives in
//! the API layer; this module only rules on legality.
//!
//! ## The Counterparty Rule
//!
//! Who may respond flips with who initiated: a mentor-initiated request
//! is answered by the startup owner, a startup-initiated request by the
//! mentor. An initiator can never accept their own request. The rule is
//! one pure function, [`can_respond`], shared by accept and decline so
//! the two paths cannot diverge.

use serde::{Deserialize, Serialize};

/// Which side of the pairing created the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitiatedBy {
    /// The mentor reached out to the startup.
    #[serde(rename = "MENTOR")]
    Mentor,
    /// The startup owner reached out to the mentor.
    #[serde(rename = "STARTUP")]
    Startup,
}

impl InitiatedBy {
    /// The canonical string name of this initiator side.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "MENTOR",
            Self::Startup => "STARTUP",
        }
    }
}

impl std::fmt::Display for InitiatedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role an actor holds with respect to one request or relationship.
///
/// Every actor is exactly one of these per pairing — never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantRole {
    /// The mentor side of the pairing.
    Mentor,
    /// The startup owner side of the pairing.
    StartupOwner,
}

/// The counterparty rule: may `responder` accept or decline a request
/// initiated by `initiated_by`?
///
/// True iff the responder is on the opposite side of the initiator.
/// Shared by accept and decline — the rule must be derived identically
/// for both, so it exists exactly once.
pub fn can_respond(initiated_by: InitiatedBy, responder: ParticipantRole) -> bool {
    matches!(
        (initiated_by, responder),
        (InitiatedBy::Mentor, ParticipantRole::StartupOwner)
            | (InitiatedBy::Startup, ParticipantRole::Mentor)
    )
}

/// Lifecycle state of a mentorship request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting a response from the counterparty.
    #[serde(rename = "PENDING")]
    Pending,
    /// Counterparty accepted. Terminal; a relationship now exists.
    #[serde(rename = "ACCEPTED")]
    Accepted,
    /// Counterparty declined. Terminal.
    #[serde(rename = "DECLINED")]
    Declined,
}

/// Errors from illegal request transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The request has already been accepted or declined.
    #[error("request already resolved to {status}; only PENDING requests can be answered")]
    AlreadyResolved {
        /// The terminal status the request currently holds.
        status: RequestStatus,
    },
    /// The target of a response must be a terminal status, not PENDING.
    #[error("a response must resolve the request to ACCEPTED or DECLINED")]
    NotAResolution,
}

impl RequestStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
        }
    }

    /// Convert a canonical status name back to a `RequestStatus`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "ACCEPTED" => Some(Self::Accepted),
            "DECLINED" => Some(Self::Declined),
            _ => None,
        }
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Rule on a response transition from the current status.
    ///
    /// Returns the new status when the transition is legal. Responding
    /// to an already-resolved request is [`RequestError::AlreadyResolved`]
    /// regardless of who asks — the status guard is separate from the
    /// counterparty check and both must pass.
    pub fn respond(self, target: RequestStatus) -> Result<RequestStatus, RequestError> {
        if target == RequestStatus::Pending {
            return Err(RequestError::NotAResolution);
        }
        match self {
            Self::Pending => Ok(target),
            resolved => Err(RequestError::AlreadyResolved { status: resolved }),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
