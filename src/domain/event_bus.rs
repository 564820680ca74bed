//! Broadcast channel for outbound notifications.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The notifier
//! publishes every [`Notification`] through the bus, and all WebSocket
//! connections subscribe to receive the ones for their chats.

use tokio::sync::broadcast;

use super::Notification;

/// Broadcast bus for [`Notification`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest notifications
/// are dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers that received it. If there are no
    /// active receivers, the notification is dropped and 0 is returned.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Creates a new receiver for all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
