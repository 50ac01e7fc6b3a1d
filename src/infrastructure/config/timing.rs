//! Time zone configuration for entry-time resolution.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// IANA zone the signal provider writes entry times in.
    #[serde(default = "default_signal_timezone")]
    pub signal_timezone: String,
    /// IANA zone of the operator.
    #[serde(default = "default_local_timezone")]
    pub local_timezone: String,
    /// Local hours below this resolve entry times against the previous day.
    #[serde(default = "default_rollover_hour")]
    pub rollover_hour: u32,
}

fn default_signal_timezone() -> String {
    "America/New_York".to_string()
}

fn default_local_timezone() -> String {
    "Africa/Windhoek".to_string()
}

const fn default_rollover_hour() -> u32 {
    7
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            signal_timezone: default_signal_timezone(),
            local_timezone: default_local_timezone(),
            rollover_hour: default_rollover_hour(),
        }
    }
}

impl TimingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown zone name.
    pub fn signal_tz(&self) -> Result<Tz, ConfigError> {
        parse_tz("signal_timezone", &self.signal_timezone)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown zone name.
    pub fn local_tz(&self) -> Result<Tz, ConfigError> {
        parse_tz("local_timezone", &self.local_timezone)
    }
}

fn parse_tz(field: &'static str, name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>().map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}
