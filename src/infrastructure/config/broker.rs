//! Broker connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ConnectionSettings;

/// Which broker client to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    /// In-process simulated broker.
    #[default]
    Paper,
}

impl BrokerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paper => "paper",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub kind: BrokerKind,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    #[serde(default = "default_startup_attempts")]
    pub startup_attempts: u32,
    #[serde(default = "default_startup_retry_secs")]
    pub startup_retry_secs: u64,
    /// File the external token refresher writes to. The
    /// `STAKELADDER_BROKER_TOKEN` environment variable wins when set.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Trade on the demo account.
    #[serde(default = "default_demo")]
    pub demo: bool,
    #[serde(default)]
    pub paper: PaperConfig,
}

const fn default_rpc_timeout_secs() -> u64 {
    10
}

const fn default_startup_attempts() -> u32 {
    10
}

const fn default_startup_retry_secs() -> u64 {
    5
}

const fn default_demo() -> bool {
    true
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            kind: BrokerKind::default(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            startup_attempts: default_startup_attempts(),
            startup_retry_secs: default_startup_retry_secs(),
            token_file: None,
            demo: default_demo(),
            paper: PaperConfig::default(),
        }
    }
}

impl BrokerConfig {
    #[must_use]
    pub const fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            rpc_timeout: Duration::from_secs(self.rpc_timeout_secs),
            startup_attempts: self.startup_attempts,
            startup_retry: Duration::from_secs(self.startup_retry_secs),
        }
    }
}

/// Simulated broker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaperConfig {
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
    /// Probability that a simulated trade wins.
    #[serde(default = "default_win_probability")]
    pub win_probability: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_starting_balance() -> Decimal {
    Decimal::from(1000)
}

const fn default_win_probability() -> f64 {
    0.5
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
            win_probability: default_win_probability(),
            currency: default_currency(),
        }
    }
}
