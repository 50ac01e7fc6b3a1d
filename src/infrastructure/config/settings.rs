//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The
//! file is TOML; every section is optional and falls back to defaults. The
//! broker token never lives in the file (see `adapter::outbound::credential`).
//!
//! # Example
//!
//! ```no_run
//! use stakeladder::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::broker::BrokerConfig;
use super::logging::LoggingConfig;
use super::monitor::MonitorConfig;
use super::parser::ParserConfig;
use super::server::ServerConfig;
use super::timing::TimingConfig;
use super::trading::TradingConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Martingale plan and trade timing.
    #[serde(default)]
    pub trading: TradingConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Outcome determination policy and polling bounds.
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where to write the operator snapshot after each cycle. Disabled when
    /// unset.
    #[serde(default)]
    pub status_file: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `server.bind` is not a socket
    /// address.
    pub fn bind_addr(&self) -> std::result::Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "bind",
                reason: e.to_string(),
            })
    }

    /// Check value ranges and time zones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if !self.server.webhook_path.starts_with('/') {
            return Err(invalid("webhook_path", "must start with '/'"));
        }

        let trading = &self.trading;
        if trading.initial_stake <= Decimal::ZERO {
            return Err(invalid("initial_stake", "must be greater than 0"));
        }
        if trading.multiplier < Decimal::ONE {
            return Err(invalid("multiplier", "must be >= 1"));
        }
        if let Err(e) = trading.plan() {
            return Err(invalid("max_level", &e.to_string()));
        }
        if trading.trade_duration_secs == 0 {
            return Err(invalid("trade_duration_secs", "must be greater than 0"));
        }
        if trading.payout < Decimal::ZERO {
            return Err(invalid("payout", "must be 0 or greater"));
        }

        self.timing.signal_tz()?;
        self.timing.local_tz()?;
        if self.timing.rollover_hour >= 24 {
            return Err(invalid("rollover_hour", "must be between 0 and 23"));
        }

        let monitor = &self.monitor;
        if monitor.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be greater than 0"));
        }
        if monitor.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0"));
        }
        if monitor.max_wait_secs == 0 {
            return Err(invalid("max_wait_secs", "must be greater than 0"));
        }
        if monitor.tolerance < Decimal::ZERO {
            return Err(invalid("tolerance", "must be 0 or greater"));
        }

        let broker = &self.broker;
        if broker.rpc_timeout_secs == 0 {
            return Err(invalid("rpc_timeout_secs", "must be greater than 0"));
        }
        if broker.startup_attempts == 0 {
            return Err(invalid("startup_attempts", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&broker.paper.win_probability) {
            return Err(invalid("win_probability", "must be between 0 and 1"));
        }
        if broker.paper.starting_balance <= Decimal::ZERO {
            return Err(invalid("starting_balance", "must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
