//! Type-safe identifiers.
//!
//! The store keys users by an internal [`UserId`]; the messaging platform
//! addresses them by [`TelegramId`] and delivers to a [`ChatId`]. All three
//! are `i64` on the wire, so each gets its own newtype to keep them apart.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype!(
    /// Internal user identifier (primary key of the `users` table).
    UserId
);

id_newtype!(
    /// Messaging-platform user identifier.
    TelegramId
);

id_newtype!(
    /// Messaging-platform chat identifier; the delivery address for notifications.
    ChatId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_number() {
        assert_eq!(TelegramId::new(123_456).to_string(), "123456");
        assert_eq!(ChatId::new(-100).to_string(), "-100");
    }

    #[test]
    fn serde_is_transparent() {
        let Ok(json) = serde_json::to_string(&UserId::new(42)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "42");
        let Ok(back) = serde_json::from_str::<UserId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, UserId::new(42));
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ChatId::new(5), "chat");
        assert_eq!(map.get(&ChatId::new(5)), Some(&"chat"));
        assert_eq!(map.get(&ChatId::new(6)), None);
    }
}
