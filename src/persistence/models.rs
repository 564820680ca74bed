//! Database row types for `users` and `faucet`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{ClaimRecord, TelegramId, User, UserId};

/// A row from the `users` table (faucet-relevant columns only).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: i64,
    /// Messaging identity.
    pub telegram_id: i64,
    /// Current level.
    pub level: i32,
    /// Credit balance.
    pub wallet_balance: Decimal,
}

impl From<UserRow> for User {
    /// Negative levels are mapped to 0 so the payout lookup reports them as
    /// invalid instead of failing the read.
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            telegram_id: TelegramId::new(row.telegram_id),
            level: u32::try_from(row.level).unwrap_or(0),
            balance: row.wallet_balance,
        }
    }
}

/// A row from the `faucet` ledger table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    /// Owner of the claim (unique).
    pub user_id: i64,
    /// Messaging identity used for the claim.
    pub telegram_id: i64,
    /// Amount credited.
    pub claim_amount: Decimal,
    /// Level at claim time.
    pub user_level: i32,
    /// Claim instant.
    pub claim_time: DateTime<Utc>,
}

impl From<ClaimRow> for ClaimRecord {
    fn from(row: ClaimRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            telegram_id: TelegramId::new(row.telegram_id),
            claim_amount: row.claim_amount,
            user_level: u32::try_from(row.user_level).unwrap_or(0),
            claim_time: row.claim_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_level_maps_to_zero() {
        let user = User::from(UserRow {
            id: 1,
            telegram_id: 2,
            level: -3,
            wallet_balance: Decimal::ZERO,
        });
        assert_eq!(user.level, 0);
        assert_eq!(user.telegram_id, TelegramId::new(2));
    }

    #[test]
    fn claim_row_converts() {
        let now = Utc::now();
        let record = ClaimRecord::from(ClaimRow {
            user_id: 5,
            telegram_id: 6,
            claim_amount: Decimal::new(1, 3),
            user_level: 1,
            claim_time: now,
        });
        assert_eq!(record.user_id, UserId::new(5));
        assert_eq!(record.user_level, 1);
        assert_eq!(record.claim_time, now);
    }
}
