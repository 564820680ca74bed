//! Level-indexed payout tiers.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::FaucetError;

/// Reference tiers as `(name, amount in thousandths)`.
const REFERENCE_TIERS: [(&str, i64); 8] = [
    ("Stone", 1),
    ("Iron", 5),
    ("Bronze", 10),
    ("Silver", 30),
    ("Gold", 125),
    ("Platinum", 500),
    ("Diamond", 2_500),
    ("Master", 15_000),
];

/// One payout tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutTier {
    /// Display name (e.g. `"Stone"`).
    pub name: String,
    /// Amount credited per claim at this tier.
    pub amount: Decimal,
}

impl PayoutTier {
    /// Creates a tier.
    #[must_use]
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Ordered payout tiers; tier `n` (1-indexed) pays users at level `n`.
///
/// Immutable after construction. Amounts are positive and strictly
/// increasing with level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutTable {
    tiers: Vec<PayoutTier>,
}

impl PayoutTable {
    /// Builds a table from tiers ordered by level.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidConfig`] if `tiers` is empty, an amount
    /// is not positive, or amounts do not strictly increase.
    pub fn new(tiers: Vec<PayoutTier>) -> Result<Self, FaucetError> {
        if tiers.is_empty() {
            return Err(FaucetError::InvalidConfig(
                "payout table needs at least one tier".to_string(),
            ));
        }
        if let Some(tier) = tiers.iter().find(|t| t.amount <= Decimal::ZERO) {
            return Err(FaucetError::InvalidConfig(format!(
                "tier {} has non-positive amount {}",
                tier.name, tier.amount
            )));
        }
        if let Some(pair) = tiers.windows(2).find(|w| match w {
            [lower, upper] => lower.amount >= upper.amount,
            _ => false,
        }) {
            let names: Vec<&str> = pair.iter().map(|t| t.name.as_str()).collect();
            return Err(FaucetError::InvalidConfig(format!(
                "payout amounts must strictly increase ({})",
                names.join(" -> ")
            )));
        }
        Ok(Self { tiers })
    }

    /// The reference eight-tier table (Stone 0.001 … Master 15).
    #[must_use]
    pub fn reference() -> Self {
        let tiers = REFERENCE_TIERS
            .iter()
            .map(|(name, thousandths)| PayoutTier::new(*name, Decimal::new(*thousandths, 3)))
            .collect();
        Self { tiers }
    }

    /// Returns the payout for `level`.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidLevel`] if `level` is 0 or above the
    /// highest configured tier.
    pub fn amount_for_level(&self, level: u32) -> Result<Decimal, FaucetError> {
        self.tier(level).map(|t| t.amount)
    }

    /// Returns the tier for `level`.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidLevel`] if `level` is out of range.
    pub fn tier(&self, level: u32) -> Result<&PayoutTier, FaucetError> {
        level
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| self.tiers.get(idx))
            .ok_or(FaucetError::InvalidLevel {
                level,
                max_level: self.max_level(),
            })
    }

    /// Highest level with a payout.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.tiers.len()).unwrap_or(u32::MAX)
    }

    /// Iterates `(level, tier)` pairs in level order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PayoutTier)> {
        (1u32..).zip(self.tiers.iter())
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl FromStr for PayoutTable {
    type Err = FaucetError;

    /// Parses `name:amount` pairs separated by commas, e.g.
    /// `"Stone:0.001,Iron:0.005"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiers = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, amount) = entry.split_once(':').ok_or_else(|| {
                    FaucetError::InvalidConfig(format!("expected name:amount, got {entry:?}"))
                })?;
                let amount = Decimal::from_str(amount.trim()).map_err(|e| {
                    FaucetError::InvalidConfig(format!("bad amount in {entry:?}: {e}"))
                })?;
                Ok(PayoutTier::new(name.trim(), amount))
            })
            .collect::<Result<Vec<_>, FaucetError>>()?;
        Self::new(tiers)
    }
}
