//! # Lifecycle Notifier
//!
//! Best-effort side channel triggered by lifecycle transitions. The
//! primary state transition is the source of truth; notification is
//! advisory, so every failure here is logged and swallowed — it must
//! never fail the mutation that triggered it.
//!
//! Delivery (address resolution, templated email, retries) is owned by
//! an external relay service. This module only hands it a recipient id
//! and a rendered subject/body.

pub mod templates;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A rendered notification addressed to one actor.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// The actor to notify. The relay resolves this to an address.
    pub recipient_id: Uuid,
    pub subject: String,
    pub body: String,
}

/// Notification delivery error.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to deliver notification: {0}")]
    DeliveryFailed(String),
}

/// Trait for notification providers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default provider: emits the notification as a structured log line.
///
/// Used in development and tests, and whenever no relay is configured.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient_id = %notification.recipient_id,
            subject = %notification.subject,
            "notification emitted"
        );
        Ok(())
    }
}

/// HTTP relay provider: POSTs the notification JSON to a configured
/// relay endpoint, which owns address resolution and actual delivery.
pub struct RelayNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayNotifier {
    /// Create a relay provider targeting `endpoint`.
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&notification)
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::DeliveryFailed(format!(
                "relay returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Fire-and-forget dispatch.
///
/// Spawns the delivery so the caller's response is never blocked on the
/// relay; a failed delivery is logged at `warn` and dropped.
pub fn dispatch(state: &crate::state::AppState, notification: Notification) {
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        let recipient = notification.recipient_id;
        if let Err(e) = notifier.send(notification).await {
            tracing::warn!(
                recipient_id = %recipient,
                error = %e,
                "notification delivery failed; transition already committed"
            );
        }
    });
}
