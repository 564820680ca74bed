//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single transport adapter connection,
//! applying subscription commands and forwarding matching notifications.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{ChatSelector, ChatTarget, WsCommand, WsMessage};
use super::subscription::SubscriptionManager;
use crate::domain::{ChatId, Notification};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and applies them.
/// - Forwards notifications from the [`broadcast::Receiver`] whose chat
///   matches the connection's subscriptions.
pub async fn run_connection(
    socket: WebSocket,
    mut notification_rx: broadcast::Receiver<Notification>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            notification = notification_rx.recv() => {
                match notification {
                    Ok(notification) => {
                        if !subs.matches(notification.chat_id()) {
                            continue;
                        }
                        let event = WsMessage::event(&notification);
                        let Ok(json) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                        tracing::debug!(
                            chat_id = %notification.chat_id(),
                            kind = notification.kind_str(),
                            "notification relayed"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { chat_ids } => {
            let (ids, wildcard) = resolve_targets(&chat_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": ids,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { chat_ids } => {
            let (ids, wildcard) = resolve_targets(&chat_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": ids,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
    };
    serde_json::to_string(&response).ok()
}

/// Splits selectors into explicit chats and the wildcard flag, skipping
/// anything that is not a chat ID.
fn resolve_targets(selectors: &[ChatSelector]) -> (Vec<ChatId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for target in selectors.iter().filter_map(|s| s.resolve()) {
        match target {
            ChatTarget::Chat(id) => ids.push(id),
            ChatTarget::All => wildcard = true,
        }
    }
    (ids, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ws::messages::WsMessageType;

    fn reply(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
        let Some(json) = handle_text_message(text, subs) else {
            panic!("expected a reply");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("reply is not an envelope: {json}");
        };
        msg
    }

    fn command(id: &str, payload: serde_json::Value) -> String {
        serde_json::json!({
            "id": id,
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": payload,
        })
        .to_string()
    }

    #[test]
    fn subscribe_then_unsubscribe() {
        let mut subs = SubscriptionManager::new();

        let msg = reply(
            &command("1", serde_json::json!({"command": "subscribe", "chat_ids": [7, "8"]})),
            &mut subs,
        );
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.id, "1");
        assert!(subs.matches(ChatId::new(7)));
        assert!(subs.matches(ChatId::new(8)));

        let msg = reply(
            &command("2", serde_json::json!({"command": "unsubscribe", "chat_ids": [7]})),
            &mut subs,
        );
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert!(!subs.matches(ChatId::new(7)));
        assert_eq!(subs.count(), 1);
    }

    #[test]
    fn wildcard_subscription() {
        let mut subs = SubscriptionManager::new();
        let _ = reply(
            &command("w", serde_json::json!({"command": "subscribe", "chat_ids": ["*"]})),
            &mut subs,
        );
        assert!(subs.is_subscribed_all());
        assert_eq!(subs.count(), 0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut subs = SubscriptionManager::new();
        let msg = reply("{not json", &mut subs);
        assert_eq!(msg.msg_type, WsMessageType::Error);
    }

    #[test]
    fn unknown_command_is_an_error() {
        let mut subs = SubscriptionManager::new();
        let msg = reply(
            &command("9", serde_json::json!({"command": "swap"})),
            &mut subs,
        );
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.id, "9");
    }
}
