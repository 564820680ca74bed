//! Notification sink.
//!
//! Delivery is best-effort: a failed notification is reported to the
//! caller as [`NotifyError`] and must never undo a committed claim.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Action, CallbackRef, ChatId, EventBus, Notification};

/// Delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Nobody is listening for the chat (e.g. the user blocked the bot or
    /// no transport adapter is connected).
    #[error("recipient unreachable: chat {0}")]
    Unreachable(ChatId),
}

/// Outbound messaging port.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Sends `text` to `chat_id` with optional buttons.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be handed off.
    async fn notify(
        &self,
        chat_id: ChatId,
        text: &str,
        actions: &[Action],
    ) -> Result<(), NotifyError>;

    /// Answers an interactive callback with a pop-up.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the answer could not be handed off.
    async fn notify_ephemeral(
        &self,
        callback: &CallbackRef,
        text: &str,
        urgent: bool,
    ) -> Result<(), NotifyError>;
}

/// [`Notifier`] that publishes onto the [`EventBus`] for WebSocket
/// transport adapters.
#[derive(Debug, Clone)]
pub struct BusNotifier {
    bus: EventBus,
}

impl BusNotifier {
    /// Creates a notifier publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let chat_id = notification.chat_id();
        match self.bus.publish(notification) {
            0 => Err(NotifyError::Unreachable(chat_id)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Notifier for BusNotifier {
    async fn notify(
        &self,
        chat_id: ChatId,
        text: &str,
        actions: &[Action],
    ) -> Result<(), NotifyError> {
        self.publish(Notification::Message {
            chat_id,
            text: text.to_string(),
            actions: actions.to_vec(),
            timestamp: Utc::now(),
        })
    }

    async fn notify_ephemeral(
        &self,
        callback: &CallbackRef,
        text: &str,
        urgent: bool,
    ) -> Result<(), NotifyError> {
        self.publish(Notification::Ephemeral {
            chat_id: callback.chat_id,
            request_id: callback.request_id.clone(),
            text: text.to_string(),
            urgent,
            timestamp: Utc::now(),
        })
    }
}
