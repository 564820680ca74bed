//! Registered participant as seen by the faucet.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{TelegramId, UserId};

/// A registered user.
///
/// Registration, leveling and wallet linking live outside this service;
/// the faucet only reads `level` and credits `balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Internal identifier.
    pub id: UserId,
    /// Messaging-platform identity the user registered with.
    pub telegram_id: TelegramId,
    /// Current level, starting at 1. Selects the payout tier.
    pub level: u32,
    /// Credit balance. Only ever increased by faucet claims.
    pub balance: Decimal,
}

impl User {
    /// Creates a user record.
    #[must_use]
    pub const fn new(id: UserId, telegram_id: TelegramId, level: u32, balance: Decimal) -> Self {
        Self {
            id,
            telegram_id,
            level,
            balance,
        }
    }
}
