//! Per-connection subscription manager.
//!
//! Tracks which chats a transport adapter relays and provides server-side
//! notification filtering.

use std::collections::HashSet;

use crate::domain::ChatId;

/// Manages the set of chat subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed chats. If `subscribe_all` is true, this set is ignored.
    chat_ids: HashSet<ChatId>,
    /// Whether the client relays every chat (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds chats to the subscription set. `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, ids: &[ChatId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.chat_ids.extend(ids.iter().copied());
    }

    /// Removes chats from the subscription set. `wildcard` clears `"*"`.
    pub fn unsubscribe(&mut self, ids: &[ChatId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.chat_ids.remove(id);
        }
    }

    /// Returns `true` if notifications for `chat_id` pass the filter.
    #[must_use]
    pub fn matches(&self, chat_id: ChatId) -> bool {
        self.subscribe_all || self.chat_ids.contains(&chat_id)
    }

    /// Returns the number of explicitly subscribed chats.
    #[must_use]
    pub fn count(&self) -> usize {
        self.chat_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(ChatId::new(1)));
    }

    #[test]
    fn subscribe_specific_chat() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ChatId::new(10)], false);
        assert!(mgr.matches(ChatId::new(10)));
        assert!(!mgr.matches(ChatId::new(11)));
    }

    #[test]
    fn wildcard_matches_everything_until_removed() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(ChatId::new(1)));
        assert!(mgr.matches(ChatId::new(-100)));
        mgr.unsubscribe(&[], true);
        assert!(!mgr.matches(ChatId::new(1)));
    }

    #[test]
    fn unsubscribe_removes_chat() {
        let mut mgr = SubscriptionManager::new();
        let id = ChatId::new(42);
        mgr.subscribe(&[id], false);
        mgr.unsubscribe(&[id], false);
        assert!(!mgr.matches(id));
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn duplicate_subscriptions_count_once() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ChatId::new(1), ChatId::new(2), ChatId::new(1)], false);
        assert_eq!(mgr.count(), 2);
    }
}
