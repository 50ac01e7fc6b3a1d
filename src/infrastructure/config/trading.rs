//! Martingale and trade timing configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::SequenceSettings;
use crate::domain::error::DomainError;
use crate::domain::MartingalePlan;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingConfig {
    /// Stake of the level-0 trade.
    #[serde(default = "default_initial_stake")]
    pub initial_stake: Decimal,
    /// Stake multiplier applied on each re-entry.
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,
    /// Highest level that may be traded (0-indexed).
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default = "default_trade_duration_secs")]
    pub trade_duration_secs: u64,
    /// Prefer the expiration carried by the signal over `trade_duration_secs`.
    #[serde(default)]
    pub use_signal_expiration: bool,
    /// Payout ratio used by the balance model (0.8 = 80%).
    #[serde(default = "default_payout")]
    pub payout: Decimal,
    /// Maximum tolerated lateness before a signal is skipped.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
    /// Fire this many milliseconds ahead of the entry time.
    #[serde(default)]
    pub entry_lead_ms: u64,
}

fn default_initial_stake() -> Decimal {
    Decimal::ONE
}

fn default_multiplier() -> Decimal {
    Decimal::TWO
}

const fn default_max_level() -> u32 {
    2
}

const fn default_trade_duration_secs() -> u64 {
    300
}

fn default_payout() -> Decimal {
    Decimal::new(8, 1)
}

const fn default_grace_secs() -> u64 {
    5
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            initial_stake: default_initial_stake(),
            multiplier: default_multiplier(),
            max_level: default_max_level(),
            trade_duration_secs: default_trade_duration_secs(),
            use_signal_expiration: false,
            payout: default_payout(),
            grace_secs: default_grace_secs(),
            entry_lead_ms: 0,
        }
    }
}

impl TradingConfig {
    /// Build the martingale plan.
    ///
    /// # Errors
    ///
    /// Propagates plan validation failures.
    pub fn plan(&self) -> Result<MartingalePlan, DomainError> {
        MartingalePlan::try_new(self.initial_stake, self.multiplier, self.max_level)
    }

    #[must_use]
    pub fn sequence_settings(&self) -> SequenceSettings {
        SequenceSettings {
            trade_duration: Duration::from_secs(self.trade_duration_secs),
            use_signal_expiration: self.use_signal_expiration,
            entry_lead: Duration::from_millis(self.entry_lead_ms),
        }
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}
