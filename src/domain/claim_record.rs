//! The claim ledger row and the write that replaces it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{TelegramId, UserId};

/// The most recent faucet claim of one user.
///
/// The ledger keeps a single row per user: every successful claim
/// overwrites it. It is not a history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    /// Owner of the claim.
    pub user_id: UserId,
    /// Messaging identity used for the claim.
    pub telegram_id: TelegramId,
    /// Amount credited.
    pub claim_amount: Decimal,
    /// User level at claim time.
    pub user_level: u32,
    /// Instant the claim was accepted.
    pub claim_time: DateTime<Utc>,
}

/// One credit-and-record write.
///
/// `expected_last_claim` is the ledger `claim_time` the eligibility decision
/// was based on (`None` for a first claim). Stores apply the commit only if
/// the ledger still holds exactly that value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCommit {
    /// User to credit.
    pub user_id: UserId,
    /// Messaging identity stored alongside the claim.
    pub telegram_id: TelegramId,
    /// Payout added to the balance and written to the ledger.
    pub amount: Decimal,
    /// Level the payout was selected for.
    pub level: u32,
    /// Decision instant; becomes the new ledger `claim_time`.
    pub claim_time: DateTime<Utc>,
    /// Ledger `claim_time` observed when deciding.
    pub expected_last_claim: Option<DateTime<Utc>>,
}

impl ClaimCommit {
    /// The ledger row this commit writes.
    #[must_use]
    pub fn to_record(&self) -> ClaimRecord {
        ClaimRecord {
            user_id: self.user_id,
            telegram_id: self.telegram_id,
            claim_amount: self.amount,
            user_level: self.level,
            claim_time: self.claim_time,
        }
    }
}

/// Result of [`crate::persistence::FaucetStore::credit_and_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Balance credited and ledger row written.
    Committed {
        /// Balance after the credit.
        new_balance: Decimal,
    },
    /// The ledger changed since the decision; nothing was written.
    Conflict {
        /// The ledger row as it is now.
        current: Option<ClaimRecord>,
    },
}
