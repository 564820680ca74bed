//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` is where chat transport adapters pick up
//! outbound notifications. An adapter subscribes to the chats it relays
//! (or `"*"`) and receives every `message` and `ephemeral` notification for
//! them.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
