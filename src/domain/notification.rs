//! Outbound notifications for the messaging transport.
//!
//! The faucet never talks to the messaging platform directly. It publishes
//! [`Notification`]s on the [`super::EventBus`]; transport adapters
//! subscribed over WebSocket deliver them to chats.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::ChatId;

/// Callback data tag of the faucet's "Claim" button.
pub const CLAIM_ACTION_TAG: &str = "faucet_claim";

/// An inline button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Action {
    /// Button label.
    pub text: String,
    /// Opaque callback data sent back when pressed.
    pub callback_data: String,
}

impl Action {
    /// Creates a button.
    #[must_use]
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }

    /// The faucet "Claim" button.
    #[must_use]
    pub fn claim() -> Self {
        Self::new("💰 Claim", CLAIM_ACTION_TAG)
    }
}

/// Identifies the interactive callback an ephemeral answer belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackRef {
    /// Platform callback query ID.
    pub request_id: String,
    /// Chat the button was pressed in.
    pub chat_id: ChatId,
}

/// A message to deliver.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A regular chat message, optionally with buttons.
    Message {
        /// Destination chat.
        chat_id: ChatId,
        /// Message text.
        text: String,
        /// Inline buttons, one per row.
        actions: Vec<Action>,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A transient pop-up answering a button press.
    Ephemeral {
        /// Chat the callback came from.
        chat_id: ChatId,
        /// Callback query being answered.
        request_id: String,
        /// Pop-up text.
        text: String,
        /// Whether the pop-up needs explicit dismissal.
        urgent: bool,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl Notification {
    /// Returns the destination chat.
    #[must_use]
    pub const fn chat_id(&self) -> ChatId {
        match self {
            Self::Message { chat_id, .. } | Self::Ephemeral { chat_id, .. } => *chat_id,
        }
    }

    /// Returns the notification kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::Ephemeral { .. } => "ephemeral",
        }
    }

    /// Returns the notification text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message { text, .. } | Self::Ephemeral { text, .. } => text,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_actions() {
        let n = Notification::Message {
            chat_id: ChatId::new(10),
            text: "hello".to_string(),
            actions: vec![Action::claim()],
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_value(&n) else {
            panic!("serialization failed");
        };
        assert_eq!(json["kind"], "message");
        assert_eq!(json["chat_id"], 10);
        assert_eq!(json["actions"][0]["callback_data"], CLAIM_ACTION_TAG);
    }

    #[test]
    fn accessors() {
        let n = Notification::Ephemeral {
            chat_id: ChatId::new(3),
            request_id: "cb-1".to_string(),
            text: "wait".to_string(),
            urgent: true,
            timestamp: Utc::now(),
        };
        assert_eq!(n.chat_id(), ChatId::new(3));
        assert_eq!(n.kind_str(), "ephemeral");
        assert_eq!(n.text(), "wait");
    }
}
