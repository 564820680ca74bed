//! Persistence layer: users and the claim ledger.
//!
//! [`FaucetStore`] is the seam between the orchestrator and storage. The
//! PostgreSQL implementation backs production; [`MemoryStore`] backs tests
//! and persistence-disabled deployments.
//!
//! # Atomicity
//!
//! [`FaucetStore::credit_and_record`] is the only write. It credits the
//! balance and upserts the ledger row in one unit that is scoped to the
//! user's row and conditioned on the ledger's `claim_time` still matching
//! the value the decision was made from. Two racing claims for the same
//! user therefore serialize, and the loser sees a conflict instead of a
//! second credit.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{ClaimCommit, ClaimRecord, CommitOutcome, TelegramId, User, UserId};
use crate::error::FaucetError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage operations the faucet needs.
#[async_trait]
pub trait FaucetStore: Send + Sync + std::fmt::Debug {
    /// Resolves a user by messaging identity. `None` means not registered.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::PersistenceError`] if the store is unavailable.
    async fn find_user(&self, telegram_id: TelegramId) -> Result<Option<User>, FaucetError>;

    /// Returns the user's ledger row. `None` means the user never claimed.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::PersistenceError`] if the store is unavailable.
    async fn last_claim(&self, user_id: UserId) -> Result<Option<ClaimRecord>, FaucetError>;

    /// Atomically credits `commit.amount` and upserts the ledger row.
    ///
    /// Applies nothing and returns [`CommitOutcome::Conflict`] when the
    /// ledger `claim_time` differs from `commit.expected_last_claim`.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::PersistenceError`] if the transaction fails;
    /// in that case neither the balance nor the ledger changed.
    async fn credit_and_record(&self, commit: &ClaimCommit) -> Result<CommitOutcome, FaucetError>;
}
