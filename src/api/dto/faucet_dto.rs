//! Faucet DTOs for the tiers, screen and callback endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ChatId, PayoutTable, TelegramId};
use crate::presentation::FaucetScreen;
use crate::service::{ClaimOutcome, ClaimReply};

/// One row of the payout table.
#[derive(Debug, Serialize, ToSchema)]
pub struct TierDto {
    /// Level the tier applies to (1-based).
    pub level: u32,
    /// Tier name (e.g. `"Stone"`).
    pub name: String,
    /// Payout per claim.
    pub amount: String,
}

/// Response body for `GET /faucet/tiers`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TiersResponse {
    /// Currency symbol of the amounts.
    pub currency: String,
    /// Cooldown between claims, in seconds.
    pub cooldown_seconds: i64,
    /// Tiers ordered by level.
    pub tiers: Vec<TierDto>,
}

impl TiersResponse {
    /// Builds the response from the payout table.
    #[must_use]
    pub fn new(table: &PayoutTable, currency: &str, cooldown_seconds: i64) -> Self {
        Self {
            currency: currency.to_string(),
            cooldown_seconds,
            tiers: table
                .iter()
                .map(|(level, tier)| TierDto {
                    level,
                    name: tier.name.clone(),
                    amount: tier.amount.to_string(),
                })
                .collect(),
        }
    }
}

/// Request body for `POST /faucet/screen`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScreenRequest {
    /// Who opened the faucet screen.
    pub telegram_id: TelegramId,
    /// Where to send the screen.
    pub chat_id: ChatId,
}

/// Response body for `POST /faucet/screen`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScreenResponse {
    /// Current balance.
    pub balance: String,
    /// Current level.
    pub level: u32,
    /// Last accepted claim, if any.
    pub last_claim: Option<DateTime<Utc>>,
    /// When the next claim is accepted, if a claim was ever made.
    pub next_claim: Option<DateTime<Utc>>,
    /// Whether a claim now would be accepted.
    pub can_claim: bool,
}

impl From<FaucetScreen> for ScreenResponse {
    fn from(screen: FaucetScreen) -> Self {
        Self {
            balance: screen.balance.to_string(),
            level: screen.level,
            last_claim: screen.last_claim,
            next_claim: screen.next_claim,
            can_claim: screen.can_claim,
        }
    }
}

/// Request body for `POST /faucet/callback`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackRequest {
    /// Platform callback query ID.
    pub callback_id: String,
    /// Who pressed the button.
    pub telegram_id: TelegramId,
    /// Where the button was pressed.
    pub chat_id: ChatId,
    /// Callback data of the pressed button.
    pub data: String,
}

/// Claim result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Balance credited.
    Claimed,
    /// Cooldown still running.
    Ineligible,
    /// Unknown user.
    NotRegistered,
}

/// Response body for `POST /faucet/callback`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    /// What happened.
    pub status: ClaimStatus,
    /// Text shown to the user.
    pub message: String,
    /// Amount credited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Level the payout was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Balance after the credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<String>,
    /// When the claim was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    /// Seconds until the next claim is accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    /// When the next claim is accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl From<ClaimReply> for ClaimResponse {
    fn from(reply: ClaimReply) -> Self {
        let base = Self {
            status: ClaimStatus::NotRegistered,
            message: reply.message,
            amount: None,
            level: None,
            new_balance: None,
            claimed_at: None,
            remaining_seconds: None,
            next_eligible_at: None,
        };
        match reply.outcome {
            ClaimOutcome::NotRegistered => base,
            ClaimOutcome::Ineligible {
                remaining,
                next_eligible_at,
            } => Self {
                status: ClaimStatus::Ineligible,
                remaining_seconds: Some(remaining.num_seconds()),
                next_eligible_at: Some(next_eligible_at),
                ..base
            },
            ClaimOutcome::Claimed {
                amount,
                level,
                claimed_at,
                new_balance,
            } => Self {
                status: ClaimStatus::Claimed,
                amount: Some(amount.to_string()),
                level: Some(level),
                new_balance: Some(new_balance.to_string()),
                claimed_at: Some(claimed_at),
                ..base
            },
        }
    }
}
