//! Claim cooldown decisions.
//!
//! [`CooldownPolicy::decide`] is a pure function of the last claim instant,
//! the current instant and the configured cooldown. It never reads a clock
//! or a store, and works on absolute UTC instants only; display timezones
//! are a presentation concern.

use chrono::{DateTime, Duration, Utc};
use crate::error::FaucetError;

/// Default minimum interval between two successful claims.
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 60;

/// Longest accepted cooldown.
pub const MAX_COOLDOWN_DAYS: i64 = 366;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    /// The user may claim now.
    Eligible,
    /// The cooldown has not elapsed.
    Wait {
        /// Earliest instant at which the next claim is accepted.
        next_eligible_at: DateTime<Utc>,
        /// Time left until `next_eligible_at`, floored to whole seconds.
        remaining: Duration,
    },
}

impl ClaimDecision {
    /// Returns `true` for [`ClaimDecision::Eligible`].
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// Earliest next claim instant, when waiting.
    #[must_use]
    pub const fn next_eligible_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Eligible => None,
            Self::Wait {
                next_eligible_at, ..
            } => Some(*next_eligible_at),
        }
    }

    /// Remaining wait, when waiting.
    #[must_use]
    pub const fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Eligible => None,
            Self::Wait { remaining, .. } => Some(*remaining),
        }
    }
}

/// Fixed-length cooldown between claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    cooldown: Duration,
}

impl CooldownPolicy {
    /// Creates a policy with the given cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidConfig`] if `cooldown` is not positive
    /// or longer than [`MAX_COOLDOWN_DAYS`].
    pub fn new(cooldown: Duration) -> Result<Self, FaucetError> {
        if cooldown <= Duration::zero() {
            return Err(FaucetError::InvalidConfig(format!(
                "cooldown must be positive, got {}s",
                cooldown.num_seconds()
            )));
        }
        if cooldown > Duration::days(MAX_COOLDOWN_DAYS) {
            return Err(FaucetError::InvalidConfig(format!(
                "cooldown must be at most {MAX_COOLDOWN_DAYS} days, got {}s",
                cooldown.num_seconds()
            )));
        }
        Ok(Self { cooldown })
    }

    /// Creates a policy from a whole number of minutes.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidConfig`] if `minutes` is not positive
    /// or out of range.
    pub fn from_minutes(minutes: i64) -> Result<Self, FaucetError> {
        let cooldown = Duration::try_minutes(minutes).ok_or_else(|| {
            FaucetError::InvalidConfig(format!("cooldown of {minutes} minutes out of range"))
        })?;
        Self::new(cooldown)
    }

    /// The configured cooldown.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Instant at which a claim made at `last_claim` stops blocking.
    #[must_use]
    pub fn next_eligible_at(&self, last_claim: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        last_claim.map(|last| self.expiry(last))
    }

    /// `last + cooldown`, saturating at the latest representable instant.
    fn expiry(&self, last: DateTime<Utc>) -> DateTime<Utc> {
        last.checked_add_signed(self.cooldown).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Decides whether a claim at `now` is allowed.
    ///
    /// A user who never claimed is always eligible. Otherwise the claim is
    /// allowed once `now - last_claim >= cooldown`; the boundary itself is
    /// eligible.
    #[must_use]
    pub fn decide(&self, last_claim: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ClaimDecision {
        let Some(last) = last_claim else {
            return ClaimDecision::Eligible;
        };

        let next_eligible_at = self.expiry(last);
        if now >= next_eligible_at {
            return ClaimDecision::Eligible;
        }

        let remaining = Duration::seconds((next_eligible_at - now).num_seconds());
        ClaimDecision::Wait {
            next_eligible_at,
            remaining,
        }
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(DEFAULT_COOLDOWN_MINUTES),
        }
    }
}
