//! PostgreSQL implementation of the faucet store.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::FaucetStore;
use super::models::{ClaimRow, UserRow};
use crate::config::FaucetConfig;
use crate::domain::{ClaimCommit, ClaimRecord, CommitOutcome, TelegramId, User, UserId};
use crate::error::FaucetError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`FaucetError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &FaucetConfig) -> Result<Self, FaucetError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`FaucetError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), FaucetError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl FaucetStore for PostgresStore {
    async fn find_user(&self, telegram_id: TelegramId) -> Result<Option<User>, FaucetError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, telegram_id, level, wallet_balance FROM users WHERE telegram_id = $1",
        )
        .bind(telegram_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn last_claim(&self, user_id: UserId) -> Result<Option<ClaimRecord>, FaucetError> {
        let row = sqlx::query_as::<_, ClaimRow>(
            "SELECT user_id, telegram_id, claim_amount, user_level, claim_time \
             FROM faucet WHERE user_id = $1",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ClaimRecord::from))
    }

    /// Runs one transaction: lock the user row, compare the ledger's
    /// `claim_time`, credit, upsert. Dropping the transaction on any `?`
    /// rolls it back.
    async fn credit_and_record(&self, commit: &ClaimCommit) -> Result<CommitOutcome, FaucetError> {
        let level = i32::try_from(commit.level).map_err(|_| FaucetError::InvalidLevel {
            level: commit.level,
            max_level: i32::MAX.unsigned_abs(),
        })?;

        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(commit.user_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(FaucetError::PersistenceError(format!(
                "user {} vanished during claim",
                commit.user_id
            )));
        }

        let current = sqlx::query_as::<_, ClaimRow>(
            "SELECT user_id, telegram_id, claim_amount, user_level, claim_time \
             FROM faucet WHERE user_id = $1",
        )
        .bind(commit.user_id.get())
        .fetch_optional(&mut *tx)
        .await?
        .map(ClaimRecord::from);

        if current.as_ref().map(|c| c.claim_time) != commit.expected_last_claim {
            tx.rollback().await?;
            return Ok(CommitOutcome::Conflict { current });
        }

        let new_balance = sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET wallet_balance = wallet_balance + $1 WHERE id = $2 \
             RETURNING wallet_balance",
        )
        .bind(commit.amount)
        .bind(commit.user_id.get())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO faucet (user_id, telegram_id, claim_amount, user_level, claim_time) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 claim_amount = EXCLUDED.claim_amount, \
                 user_level = EXCLUDED.user_level, \
                 claim_time = EXCLUDED.claim_time, \
                 telegram_id = EXCLUDED.telegram_id",
        )
        .bind(commit.user_id.get())
        .bind(commit.telegram_id.get())
        .bind(commit.amount)
        .bind(level)
        .bind(commit.claim_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CommitOutcome::Committed { new_balance })
    }
}
