//! In-memory store with per-user fine-grained locking.
//!
//! [`MemoryStore`] keeps every account behind its own
//! [`tokio::sync::Mutex`], so claims for different users proceed
//! concurrently while claims for the same user serialize on the commit.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

use super::FaucetStore;
use crate::domain::{ClaimCommit, ClaimRecord, CommitOutcome, TelegramId, User, UserId};
use crate::error::FaucetError;

/// User row plus its ledger row.
#[derive(Debug, Clone)]
struct Account {
    user: User,
    claim: Option<ClaimRecord>,
}

#[derive(Debug, Default)]
struct Index {
    accounts: HashMap<UserId, Arc<Mutex<Account>>>,
    by_telegram: HashMap<TelegramId, UserId>,
}

/// Process-local [`FaucetStore`].
///
/// Also lets callers register users (registration is not part of the
/// faucet) and inject failures.
///
/// # Concurrency
///
/// - The outer index is a `RwLock`; lookups share it.
/// - Each account has its own `Mutex`, held for the whole
///   compare-credit-record sequence of [`FaucetStore::credit_and_record`].
#[derive(Debug)]
pub struct MemoryStore {
    index: RwLock<Index>,
    next_id: AtomicI64,
    fail_next_record: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: RwLock::new(Index::default()),
            next_id: AtomicI64::new(1),
            fail_next_record: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Registers a user and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidRequest`] if `telegram_id` is already
    /// registered or `balance` is negative.
    pub async fn register(
        &self,
        telegram_id: TelegramId,
        level: u32,
        balance: Decimal,
    ) -> Result<User, FaucetError> {
        if balance.is_sign_negative() {
            return Err(FaucetError::InvalidRequest(format!(
                "balance must be non-negative, got {balance}"
            )));
        }
        let mut index = self.index.write().await;
        if index.by_telegram.contains_key(&telegram_id) {
            return Err(FaucetError::InvalidRequest(format!(
                "telegram id {telegram_id} already registered"
            )));
        }
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let user = User::new(id, telegram_id, level, balance);
        index.by_telegram.insert(telegram_id, id);
        index.accounts.insert(
            id,
            Arc::new(Mutex::new(Account {
                user: user.clone(),
                claim: None,
            })),
        );
        tracing::debug!(user_id = %id, %telegram_id, level, "user registered");
        Ok(user)
    }

    /// Changes a user's level, as the external leveling system would.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidRequest`] if the user does not exist.
    pub async fn set_level(&self, user_id: UserId, level: u32) -> Result<(), FaucetError> {
        let account = self.account(user_id).await?;
        account.lock().await.user.level = level;
        Ok(())
    }

    /// Returns the stored user, if any.
    pub async fn user(&self, user_id: UserId) -> Option<User> {
        let account = self.index.read().await.accounts.get(&user_id).cloned()?;
        let guard = account.lock().await;
        Some(guard.user.clone())
    }

    /// Number of ledger rows across all users.
    pub async fn ledger_len(&self) -> usize {
        let index = self.index.read().await;
        let mut rows = 0;
        for account in index.accounts.values() {
            if account.lock().await.claim.is_some() {
                rows += 1;
            }
        }
        rows
    }

    /// Makes the next [`FaucetStore::credit_and_record`] fail after the
    /// balance credit has been staged but before the ledger row is written.
    pub fn fail_next_record(&self) {
        self.fail_next_record.store(true, Ordering::SeqCst);
    }

    /// Makes every operation fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.index.read().await.accounts.len()
    }

    /// Returns `true` if no user is registered.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.accounts.is_empty()
    }

    fn check_available(&self) -> Result<(), FaucetError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FaucetError::PersistenceError("store unavailable".to_string()));
        }
        Ok(())
    }

    async fn account(&self, user_id: UserId) -> Result<Arc<Mutex<Account>>, FaucetError> {
        self.index
            .read()
            .await
            .accounts
            .get(&user_id)
            .cloned()
            .ok_or_else(|| FaucetError::InvalidRequest(format!("unknown user {user_id}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FaucetStore for MemoryStore {
    async fn find_user(&self, telegram_id: TelegramId) -> Result<Option<User>, FaucetError> {
        self.check_available()?;
        let account = {
            let index = self.index.read().await;
            index
                .by_telegram
                .get(&telegram_id)
                .and_then(|id| index.accounts.get(id))
                .cloned()
        };
        let Some(account) = account else {
            return Ok(None);
        };
        let guard = account.lock().await;
        Ok(Some(guard.user.clone()))
    }

    async fn last_claim(&self, user_id: UserId) -> Result<Option<ClaimRecord>, FaucetError> {
        self.check_available()?;
        let account = self.index.read().await.accounts.get(&user_id).cloned();
        let Some(account) = account else {
            return Ok(None);
        };
        let guard = account.lock().await;
        Ok(guard.claim.clone())
    }

    async fn credit_and_record(&self, commit: &ClaimCommit) -> Result<CommitOutcome, FaucetError> {
        self.check_available()?;
        let account = self.account(commit.user_id).await.map_err(|_| {
            FaucetError::PersistenceError(format!("user {} vanished during claim", commit.user_id))
        })?;
        let mut guard = account.lock().await;

        let current = guard.claim.as_ref().map(|c| c.claim_time);
        if current != commit.expected_last_claim {
            return Ok(CommitOutcome::Conflict {
                current: guard.claim.clone(),
            });
        }

        // Work on a copy; the account is only replaced once both writes succeed.
        let mut staged = guard.clone();
        staged.user.balance = staged
            .user
            .balance
            .checked_add(commit.amount)
            .ok_or_else(|| FaucetError::PersistenceError("balance overflow".to_string()))?;

        if self.fail_next_record.swap(false, Ordering::SeqCst) {
            return Err(FaucetError::PersistenceError("ledger upsert failed".to_string()));
        }
        staged.claim = Some(commit.to_record());

        let new_balance = staged.user.balance;
        *guard = staged;
        Ok(CommitOutcome::Committed { new_balance })
    }
}
