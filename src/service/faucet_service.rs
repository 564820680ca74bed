//! Faucet service: the claim state machine.
//!
//! ```text
//! claim ─► Lookup ─┬─► NotRegistered
//!                  └─► Decide ─┬─► Ineligible
//!                              └─► Credit + Record ─┬─► Claimed
//!                                    (one txn)      ├─► Conflict ─► Decide again
//!                                                   └─► Err (rolled back)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::domain::{
    Action, CLAIM_ACTION_TAG, CallbackRef, ChatId, ClaimCommit, ClaimDecision, CommitOutcome,
    CooldownPolicy, PayoutTable, TelegramId,
};
use crate::error::FaucetError;
use crate::notifier::Notifier;
use crate::persistence::FaucetStore;
use crate::presentation::{FaucetScreen, MessageRenderer};

/// How often a claim re-decides after losing a commit race before giving up.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Terminal state of a claim attempt that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// No account for the messaging identity. Nothing was written.
    NotRegistered,
    /// Cooldown still running. Nothing was written.
    Ineligible {
        /// Wait left, floored to whole seconds.
        remaining: Duration,
        /// When the next claim is accepted.
        next_eligible_at: DateTime<Utc>,
    },
    /// Balance credited and ledger updated.
    Claimed {
        /// Amount credited.
        amount: Decimal,
        /// Level the payout was taken from.
        level: u32,
        /// New ledger `claim_time`.
        claimed_at: DateTime<Utc>,
        /// Balance after the credit.
        new_balance: Decimal,
    },
}

/// A "Claim" button press relayed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCallback {
    /// Platform callback query ID.
    pub callback_id: String,
    /// Who pressed the button.
    pub telegram_id: TelegramId,
    /// Where the button was pressed.
    pub chat_id: ChatId,
    /// Callback data of the button.
    pub data: String,
}

/// Outcome of a claim callback plus the text the user was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReply {
    /// What happened.
    pub outcome: ClaimOutcome,
    /// Pop-up text sent to the user.
    pub message: String,
}

/// Orchestrates faucet claims.
///
/// Holds no per-user state: users and ledger rows are loaned from the
/// [`FaucetStore`] for the duration of one request. Correctness under
/// concurrent claims comes from [`FaucetStore::credit_and_record`] being
/// conditioned on the ledger row the decision was based on.
#[derive(Debug, Clone)]
pub struct FaucetService {
    store: Arc<dyn FaucetStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: CooldownPolicy,
    payouts: Arc<PayoutTable>,
    renderer: MessageRenderer,
}

impl FaucetService {
    /// Creates a new `FaucetService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn FaucetStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: CooldownPolicy,
        payouts: Arc<PayoutTable>,
        renderer: MessageRenderer,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            policy,
            payouts,
            renderer,
        }
    }

    /// Returns the cooldown policy.
    #[must_use]
    pub const fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }

    /// Returns the payout table.
    #[must_use]
    pub fn payout_table(&self) -> &PayoutTable {
        &self.payouts
    }

    /// Returns the message renderer.
    #[must_use]
    pub const fn renderer(&self) -> &MessageRenderer {
        &self.renderer
    }

    /// Runs one claim attempt for `telegram_id`.
    ///
    /// Every outcome other than [`ClaimOutcome::Claimed`] leaves the store
    /// untouched, so callers may retry freely.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::PersistenceError`] if the store fails (the
    /// transaction is rolled back) and [`FaucetError::InvalidLevel`] if the
    /// user's level has no payout tier.
    pub async fn claim(&self, telegram_id: TelegramId) -> Result<ClaimOutcome, FaucetError> {
        let Some(user) = self.store.find_user(telegram_id).await? else {
            tracing::debug!(%telegram_id, "claim from unregistered user");
            return Ok(ClaimOutcome::NotRegistered);
        };

        let mut last_claim = self
            .store
            .last_claim(user.id)
            .await?
            .map(|record| record.claim_time);

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            // Stores keep microseconds; compare-and-swap needs identical values.
            let now = self.clock.now().trunc_subsecs(6);

            if let ClaimDecision::Wait {
                next_eligible_at,
                remaining,
            } = self.policy.decide(last_claim, now)
            {
                tracing::debug!(
                    user_id = %user.id,
                    remaining_secs = remaining.num_seconds(),
                    "claim inside cooldown"
                );
                return Ok(ClaimOutcome::Ineligible {
                    remaining,
                    next_eligible_at,
                });
            }

            let amount = self.payouts.amount_for_level(user.level).inspect_err(|err| {
                tracing::error!(
                    user_id = %user.id,
                    level = user.level,
                    error = %err,
                    "user level outside payout table"
                );
            })?;

            let commit = ClaimCommit {
                user_id: user.id,
                telegram_id,
                amount,
                level: user.level,
                claim_time: now,
                expected_last_claim: last_claim,
            };

            match self.store.credit_and_record(&commit).await? {
                CommitOutcome::Committed { new_balance } => {
                    tracing::info!(
                        user_id = %user.id,
                        level = user.level,
                        %amount,
                        %new_balance,
                        "faucet claim credited"
                    );
                    return Ok(ClaimOutcome::Claimed {
                        amount,
                        level: user.level,
                        claimed_at: now,
                        new_balance,
                    });
                }
                CommitOutcome::Conflict { current } => {
                    tracing::warn!(
                        user_id = %user.id,
                        attempt,
                        "ledger changed during claim, re-deciding"
                    );
                    last_claim = current.map(|record| record.claim_time);
                }
            }
        }

        Err(FaucetError::PersistenceError(format!(
            "claim for user {} kept conflicting after {MAX_COMMIT_ATTEMPTS} attempts",
            user.id
        )))
    }

    /// Builds the faucet screen for `telegram_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::NotRegistered`] for unknown users and
    /// [`FaucetError::PersistenceError`] if the store fails.
    pub async fn faucet_screen(
        &self,
        telegram_id: TelegramId,
    ) -> Result<FaucetScreen, FaucetError> {
        let user = self
            .store
            .find_user(telegram_id)
            .await?
            .ok_or(FaucetError::NotRegistered(telegram_id))?;
        let last_claim = self
            .store
            .last_claim(user.id)
            .await?
            .map(|record| record.claim_time);

        Ok(FaucetScreen {
            balance: user.balance,
            level: user.level,
            last_claim,
            next_claim: self.policy.next_eligible_at(last_claim),
            can_claim: self.policy.decide(last_claim, self.clock.now()).is_eligible(),
        })
    }

    /// Sends the faucet screen with a "Claim" button to `chat_id`.
    ///
    /// Unregistered users are told to register instead.
    ///
    /// # Errors
    ///
    /// Same as [`FaucetService::faucet_screen`]; the user has been notified
    /// either way.
    pub async fn show_faucet_screen(
        &self,
        chat_id: ChatId,
        telegram_id: TelegramId,
    ) -> Result<FaucetScreen, FaucetError> {
        match self.faucet_screen(telegram_id).await {
            Ok(screen) => {
                let text = self.renderer.faucet_screen(&screen, &self.payouts);
                self.deliver(chat_id, &text, &[Action::claim()]).await;
                Ok(screen)
            }
            Err(err @ FaucetError::NotRegistered(_)) => {
                self.deliver(chat_id, &self.renderer.not_registered(), &[])
                    .await;
                Err(err)
            }
            Err(err) => {
                tracing::error!(%chat_id, %telegram_id, error = %err, "faucet screen failed");
                self.deliver(chat_id, &self.renderer.generic_error(), &[])
                    .await;
                Err(err)
            }
        }
    }

    /// Handles a faucet button press and answers it with a pop-up.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidRequest`] if `callback.data` is not a
    /// faucet claim, otherwise the errors of [`FaucetService::claim`]; the
    /// user has then been shown the generic retry message.
    pub async fn handle_claim_action(
        &self,
        callback: &ClaimCallback,
    ) -> Result<ClaimReply, FaucetError> {
        if !callback.data.starts_with(CLAIM_ACTION_TAG) {
            return Err(FaucetError::InvalidRequest(format!(
                "unsupported callback data {:?}",
                callback.data
            )));
        }

        let reference = CallbackRef {
            request_id: callback.callback_id.clone(),
            chat_id: callback.chat_id,
        };

        match self.claim(callback.telegram_id).await {
            Ok(outcome) => {
                let message = self.render_outcome(&outcome);
                self.deliver_ephemeral(&reference, &message).await;
                Ok(ClaimReply { outcome, message })
            }
            Err(err) => {
                tracing::error!(
                    telegram_id = %callback.telegram_id,
                    error = %err,
                    "faucet claim failed"
                );
                self.deliver_ephemeral(&reference, &self.renderer.claim_failed())
                    .await;
                Err(err)
            }
        }
    }

    fn render_outcome(&self, outcome: &ClaimOutcome) -> String {
        match outcome {
            ClaimOutcome::NotRegistered => self.renderer.not_registered_alert(),
            ClaimOutcome::Ineligible {
                remaining,
                next_eligible_at,
            } => self.renderer.claim_wait(*remaining, *next_eligible_at),
            ClaimOutcome::Claimed { amount, .. } => self
                .renderer
                .claim_success(*amount, self.policy.cooldown()),
        }
    }

    async fn deliver(&self, chat_id: ChatId, text: &str, actions: &[Action]) {
        if let Err(err) = self.notifier.notify(chat_id, text, actions).await {
            tracing::warn!(%chat_id, error = %err, "notification dropped");
        }
    }

    async fn deliver_ephemeral(&self, callback: &CallbackRef, text: &str) {
        if let Err(err) = self.notifier.notify_ephemeral(callback, text, true).await {
            tracing::warn!(
                chat_id = %callback.chat_id,
                request_id = %callback.request_id,
                error = %err,
                "callback answer dropped"
            );
        }
    }
}
