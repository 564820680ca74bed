//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, Notification};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Wraps a notification as a server-generated event.
    #[must_use]
    pub fn event(notification: &Notification) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "event": "notification",
                "data": notification,
            }),
        }
    }

    /// Builds a response to the command with the given `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message,
            }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a transport adapter can send, carried in
/// [`WsMessage::payload`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Relay notifications for specific chats.
    Subscribe {
        /// Chat IDs to subscribe to. Use `["*"]` for all chats.
        chat_ids: Vec<ChatSelector>,
    },
    /// Stop relaying notifications for specific chats.
    Unsubscribe {
        /// Chat IDs to unsubscribe from. `"*"` clears the wildcard.
        chat_ids: Vec<ChatSelector>,
    },
}

/// A chat ID as sent by clients: a number, a numeric string or `"*"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChatSelector {
    /// Numeric chat ID.
    Id(i64),
    /// String form, parsed by [`ChatSelector::resolve`].
    Text(String),
}

/// What a [`ChatSelector`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    /// A single chat.
    Chat(ChatId),
    /// Every chat.
    All,
}

impl ChatSelector {
    /// Resolves the selector, or `None` if it is not a valid chat ID.
    #[must_use]
    pub fn resolve(&self) -> Option<ChatTarget> {
        match self {
            Self::Id(id) => Some(ChatTarget::Chat(ChatId::new(*id))),
            Self::Text(s) if s == "*" => Some(ChatTarget::All),
            Self::Text(s) => s.trim().parse().ok().map(|id| ChatTarget::Chat(ChatId::new(id))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_parses_mixed_ids() {
        let raw = serde_json::json!({"command": "subscribe", "chat_ids": [5, "-7", "*", "x"]});
        let Ok(WsCommand::Subscribe { chat_ids }) = serde_json::from_value::<WsCommand>(raw) else {
            panic!("expected subscribe");
        };
        let targets: Vec<Option<ChatTarget>> = chat_ids.iter().map(ChatSelector::resolve).collect();
        assert_eq!(
            targets,
            vec![
                Some(ChatTarget::Chat(ChatId::new(5))),
                Some(ChatTarget::Chat(ChatId::new(-7))),
                Some(ChatTarget::All),
                None,
            ]
        );
    }

    #[test]
    fn unknown_command_rejected() {
        let raw = serde_json::json!({"command": "swap", "chat_ids": []});
        assert!(serde_json::from_value::<WsCommand>(raw).is_err());
    }

    #[test]
    fn event_wraps_notification() {
        let notification = Notification::Message {
            chat_id: ChatId::new(3),
            text: "hello".to_string(),
            actions: Vec::new(),
            timestamp: Utc::now(),
        };
        let msg = WsMessage::event(&notification);
        assert_eq!(msg.msg_type, WsMessageType::Event);
        let field = |path: &str| msg.payload.pointer(path).cloned();
        assert_eq!(field("/event"), Some(serde_json::json!("notification")));
        assert_eq!(field("/data/kind"), Some(serde_json::json!("message")));
        assert_eq!(field("/data/chat_id"), Some(serde_json::json!(3)));
    }
}
