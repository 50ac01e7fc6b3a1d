//! Outcome monitor configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::{MonitorSettings, OutcomePolicy};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub policy: OutcomePolicy,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Balance polls before assuming a loss.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Hard cap on total polling time.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
    /// Allowed distance between observed and expected balances.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_max_attempts() -> u32 {
    10
}

const fn default_max_wait_secs() -> u64 {
    30
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

const fn default_settle_delay_ms() -> u64 {
    50
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            policy: OutcomePolicy::default(),
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            max_wait_secs: default_max_wait_secs(),
            tolerance: default_tolerance(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub fn settings(&self, payout: Decimal) -> MonitorSettings {
        MonitorSettings {
            policy: self.policy,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_attempts,
            max_wait: Duration::from_secs(self.max_wait_secs),
            tolerance: self.tolerance,
            payout,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}
