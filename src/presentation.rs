//! Human-facing rendering of faucet state.
//!
//! Eligibility math works on UTC instants; only this module converts to
//! the configured display timezone and builds message text.

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::PayoutTable;
use crate::error::FaucetError;

const RULE: &str = "─────────────";

/// Fixed-offset timezone used for displayed times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayZone {
    offset: FixedOffset,
    label: String,
}

impl DisplayZone {
    /// Creates a zone `offset_minutes` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidConfig`] if the offset is not within
    /// ±24 hours.
    pub fn new(offset_minutes: i32, label: &str) -> Result<Self, FaucetError> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                FaucetError::InvalidConfig(format!(
                    "display offset {offset_minutes} minutes out of range"
                ))
            })?;
        Ok(Self {
            offset,
            label: label.to_string(),
        })
    }

    /// Timezone label (e.g. `"IST"`).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Renders `D/M/YYYY, h:mm:ss am`.
    #[must_use]
    pub fn format_datetime(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%-d/%-m/%Y, %-I:%M:%S %P")
            .to_string()
    }

    /// Renders `h:mm:ss am`.
    #[must_use]
    pub fn format_clock(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%-I:%M:%S %P")
            .to_string()
    }
}

impl Default for DisplayZone {
    /// UTC+05:30, labelled IST.
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(330 * 60).unwrap_or_else(|| Utc.fix()),
            label: "IST".to_string(),
        }
    }
}

/// Renders a wait as `{m}m {ss}s`.
#[must_use]
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// Renders an amount with six decimals.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{amount:.6}")
}

/// Renders a cooldown in words: `1 hour`, `2 hours`, `90 minutes`.
#[must_use]
pub fn format_cooldown(cooldown: Duration) -> String {
    let secs = cooldown.num_seconds();
    let (value, unit) = if secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if value == 1 {
        format!("1 {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Snapshot of a user's faucet state, as shown on the faucet screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaucetScreen {
    /// Current balance.
    pub balance: Decimal,
    /// Current level.
    pub level: u32,
    /// Last accepted claim.
    pub last_claim: Option<DateTime<Utc>>,
    /// When the last claim stops blocking.
    pub next_claim: Option<DateTime<Utc>>,
    /// Whether a claim now would be accepted.
    pub can_claim: bool,
}

/// Builds message text in the configured zone and currency.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    zone: DisplayZone,
    currency: String,
}

impl MessageRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new(zone: DisplayZone, currency: impl Into<String>) -> Self {
        Self {
            zone,
            currency: currency.into(),
        }
    }

    /// The display zone.
    #[must_use]
    pub const fn zone(&self) -> &DisplayZone {
        &self.zone
    }

    /// The currency symbol.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Chat message for an unregistered user.
    #[must_use]
    pub fn not_registered(&self) -> String {
        "⚠️ You are not registered. Please use /start first.".to_string()
    }

    /// Pop-up for an unregistered user pressing "Claim".
    #[must_use]
    pub fn not_registered_alert(&self) -> String {
        "You are not registered. Use /start.".to_string()
    }

    /// Pop-up for a successful claim.
    #[must_use]
    pub fn claim_success(&self, amount: Decimal, cooldown: Duration) -> String {
        format!(
            "🎉 Success! You claimed {} {}. Come back in {}.",
            format_amount(amount),
            self.currency,
            format_cooldown(cooldown)
        )
    }

    /// Pop-up for a claim inside the cooldown.
    #[must_use]
    pub fn claim_wait(&self, remaining: Duration, next_eligible_at: DateTime<Utc>) -> String {
        format!(
            "⏳ Next claim in {} (at {} {}).",
            format_countdown(remaining),
            self.zone.format_clock(next_eligible_at),
            self.zone.label()
        )
    }

    /// Pop-up for a claim that failed and left no trace.
    #[must_use]
    pub fn claim_failed(&self) -> String {
        "❌ Error claiming. Please try again.".to_string()
    }

    /// Chat message when the faucet screen could not be loaded.
    #[must_use]
    pub fn generic_error(&self) -> String {
        "❌ Faucet is unavailable right now. Please try again later.".to_string()
    }

    /// The level/payout table with the user's tier ticked.
    #[must_use]
    pub fn level_table(&self, table: &PayoutTable, current_level: u32) -> String {
        table
            .iter()
            .map(|(level, tier)| {
                let mark = if level == current_level { "✅" } else { "◽️" };
                format!(
                    "{mark} {:<8} — {} {}",
                    tier.name,
                    format_amount(tier.amount),
                    self.currency
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The full faucet screen.
    #[must_use]
    pub fn faucet_screen(&self, screen: &FaucetScreen, table: &PayoutTable) -> String {
        let last = screen
            .last_claim
            .map_or_else(|| "Never".to_string(), |t| self.zone.format_datetime(t));
        let next = screen
            .next_claim
            .map_or_else(|| "Anytime".to_string(), |t| self.zone.format_datetime(t));
        let status = if screen.can_claim {
            "✅ Ready to claim"
        } else {
            "⏳ Not ready"
        };
        [
            "🏆 Your Faucet Stats".to_string(),
            RULE.to_string(),
            format!("💲 Balance: {} credits", format_amount(screen.balance)),
            format!("🕰️ Last Claim: {last}"),
            format!("⏰ Next Claim: {next}"),
            format!("📌 Status: {status}"),
            RULE.to_string(),
            "📊 Levels & Payouts".to_string(),
            self.level_table(table, screen.level),
        ]
        .join("\n")
    }
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new(DisplayZone::default(), "TRX")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        let Some(t) = Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).single() else {
            panic!("valid timestamp");
        };
        t
    }

    #[test]
    fn countdown_pads_seconds() {
        assert_eq!(format_countdown(Duration::minutes(30)), "30m 00s");
        assert_eq!(format_countdown(Duration::seconds(65)), "1m 05s");
        assert_eq!(format_countdown(Duration::seconds(-4)), "0m 00s");
    }

    #[test]
    fn amounts_have_six_decimals() {
        assert_eq!(format_amount(Decimal::new(1, 3)), "0.001000");
        assert_eq!(format_amount(Decimal::new(15, 0)), "15.000000");
    }

    #[test]
    fn cooldown_in_words() {
        assert_eq!(format_cooldown(Duration::minutes(60)), "1 hour");
        assert_eq!(format_cooldown(Duration::hours(2)), "2 hours");
        assert_eq!(format_cooldown(Duration::minutes(90)), "90 minutes");
        assert_eq!(format_cooldown(Duration::minutes(1)), "1 minute");
        assert_eq!(format_cooldown(Duration::seconds(45)), "45 seconds");
    }

    #[test]
    fn clock_uses_display_offset() {
        let zone = DisplayZone::default();
        // 08:00 UTC is 13:30 IST
        assert_eq!(zone.format_clock(at(8, 0, 0)), "1:30:00 pm");
        assert_eq!(zone.format_datetime(at(8, 0, 0)), "10/3/2024, 1:30:00 pm");
    }

    #[test]
    fn out_of_range_offset_rejected() {
        assert!(DisplayZone::new(24 * 60, "X").is_err());
        assert!(DisplayZone::new(i32::MAX, "X").is_err());
        assert!(DisplayZone::new(-300, "EST").is_ok());
    }

    #[test]
    fn wait_message() {
        let renderer = MessageRenderer::default();
        let text = renderer.claim_wait(Duration::minutes(30), at(9, 0, 0));
        assert_eq!(text, "⏳ Next claim in 30m 00s (at 2:30:00 pm IST).");
    }

    #[test]
    fn success_message() {
        let renderer = MessageRenderer::default();
        let text = renderer.claim_success(Decimal::new(1, 3), Duration::minutes(60));
        assert_eq!(
            text,
            "🎉 Success! You claimed 0.001000 TRX. Come back in 1 hour."
        );
    }

    #[test]
    fn level_table_marks_current_tier() {
        let renderer = MessageRenderer::default();
        let table = renderer.level_table(&PayoutTable::reference(), 2);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines.first().copied(), Some("◽️ Stone    — 0.001000 TRX"));
        assert_eq!(lines.get(1).copied(), Some("✅ Iron     — 0.005000 TRX"));
    }

    #[test]
    fn screen_for_new_user() {
        let renderer = MessageRenderer::default();
        let screen = FaucetScreen {
            balance: Decimal::ZERO,
            level: 1,
            last_claim: None,
            next_claim: None,
            can_claim: true,
        };
        let text = renderer.faucet_screen(&screen, &PayoutTable::reference());
        assert!(text.contains("Last Claim: Never"));
        assert!(text.contains("Next Claim: Anytime"));
        assert!(text.contains("Status: ✅ Ready to claim"));
        assert!(text.contains("💲 Balance: 0.000000 credits"));
    }
}
