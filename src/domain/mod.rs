//! Domain layer: identities, records, cooldown and payout rules.
//!
//! Everything here is free of I/O. [`CooldownPolicy`] and [`PayoutTable`]
//! are immutable configuration injected into the orchestrator at startup.

pub mod claim_record;
pub mod cooldown;
pub mod event_bus;
pub mod ids;
pub mod notification;
pub mod payout;
pub mod user;

pub use claim_record::{ClaimCommit, ClaimRecord, CommitOutcome};
pub use cooldown::{ClaimDecision, CooldownPolicy};
pub use event_bus::EventBus;
pub use ids::{ChatId, TelegramId, UserId};
pub use notification::{Action, CLAIM_ACTION_TAG, CallbackRef, Notification};
pub use payout::{PayoutTable, PayoutTier};
pub use user::User;
