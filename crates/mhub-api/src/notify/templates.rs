//! Notification content for each lifecycle transition.
//!
//! One constructor per event; each takes the recipient and just enough
//! context to render a subject/body pair. Rendering stays here so route
//! handlers never concatenate user-facing copy inline.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Notification;

/// A new mentorship request was created; notify the counterparty.
pub fn request_created(recipient_id: Uuid, startup_name: &str, message: &str) -> Notification {
    Notification {
        recipient_id,
        subject: format!("New mentorship request for {startup_name}"),
        body: format!(
            "You have a new mentorship request regarding {startup_name}.\n\n\"{message}\"\n\n\
             Review it from your dashboard to accept or decline."
        ),
    }
}

/// A request was accepted; notify the initiator.
pub fn request_accepted(recipient_id: Uuid, startup_name: &str, response: Option<&str>) -> Notification {
    let mut body = format!(
        "Your mentorship request regarding {startup_name} was accepted. \
         The mentorship session is now active."
    );
    if let Some(response) = response {
        body.push_str(&format!("\n\n\"{response}\""));
    }
    Notification {
        recipient_id,
        subject: format!("Mentorship request accepted — {startup_name}"),
        body,
    }
}

/// A request was declined; notify the initiator.
pub fn request_declined(recipient_id: Uuid, startup_name: &str, response: Option<&str>) -> Notification {
    let mut body = format!("Your mentorship request regarding {startup_name} was declined.");
    if let Some(response) = response {
        body.push_str(&format!("\n\n\"{response}\""));
    }
    Notification {
        recipient_id,
        subject: format!("Mentorship request declined — {startup_name}"),
        body,
    }
}

/// A call was proposed; notify the counterparty.
pub fn call_proposed(
    recipient_id: Uuid,
    title: &str,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i64,
) -> Notification {
    Notification {
        recipient_id,
        subject: format!("Call proposed: {title}"),
        body: format!(
            "A call \"{title}\" was proposed for {} ({duration_minutes} minutes). \
             Confirm or decline it from your session page.",
            scheduled_at.to_rfc3339()
        ),
    }
}

/// A proposed call was confirmed; notify the proposer.
pub fn call_confirmed(recipient_id: Uuid, title: &str, meeting_url: &str) -> Notification {
    Notification {
        recipient_id,
        subject: format!("Call confirmed: {title}"),
        body: format!("Your call \"{title}\" was confirmed. Join at {meeting_url}."),
    }
}

/// A proposed call was declined; notify the proposer.
pub fn call_declined(recipient_id: Uuid, title: &str) -> Notification {
    Notification {
        recipient_id,
        subject: format!("Call declined: {title}"),
        body: format!("Your call \"{title}\" was declined. Propose a new time from your session page."),
    }
}
