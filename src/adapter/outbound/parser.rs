//! Regex parser for signal-channel notifications.
//!
//! Expected shape (emoji and ordering are not significant):
//!
//! ```text
//! 🇪🇺 EUR/USD 🇺🇸 OTC
//! 🕘 Expiration 5M
//! ⏺ Entry at 10:59
//! 🟩 BUY
//! ```

use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::ParsedNotification;
use crate::port::NotificationParser;

pub struct RegexNotificationParser {
    asset: Regex,
    expiration: Regex,
    direction: Regex,
    entry_time: Regex,
    otc_suffix: String,
}

impl RegexNotificationParser {
    /// # Errors
    ///
    /// Fails only if a built-in pattern does not compile.
    pub fn new(otc_suffix: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            asset: Regex::new(r"([A-Z]{3}/[A-Z]{3}|\b[A-Z]{6}\b)\s*(OTC)?")?,
            expiration: Regex::new(r"Expiration\s+(\d+)([MH])")?,
            direction: Regex::new(r"(?i)(🟩|🟥|⬆️|⬇️|🔼|🔽)\s*(BUY|SELL|UP|DOWN)")?,
            entry_time: Regex::new(r"Entry at (\d{2}:\d{2})")?,
            otc_suffix: otc_suffix.into(),
        })
    }

    fn asset(&self, text: &str) -> Option<String> {
        let caps = self.asset.captures(text)?;
        let base = caps.get(1)?.as_str().replace('/', "");
        Some(format!("{base}{}", self.otc_suffix))
    }

    fn expiration(&self, text: &str) -> Option<Duration> {
        let caps = self.expiration.captures(text)?;
        let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
        let secs = match caps.get(2)?.as_str() {
            "H" => amount.checked_mul(3600)?,
            _ => amount.checked_mul(60)?,
        };
        if secs == 0 {
            warn!("Ignoring zero expiration");
            return None;
        }
        Some(Duration::from_secs(secs))
    }

    fn direction(&self, text: &str) -> Option<String> {
        let caps = self.direction.captures(text)?;
        Some(caps.get(2)?.as_str().to_ascii_uppercase())
    }

    fn entry_time(&self, text: &str) -> Option<String> {
        let caps = self.entry_time.captures(text)?;
        Some(caps.get(1)?.as_str().to_string())
    }
}

impl NotificationParser for RegexNotificationParser {
    fn parse(&self, text: &str) -> ParsedNotification {
        let parsed = ParsedNotification {
            asset: self.asset(text),
            direction: self.direction(text),
            entry_time: self.entry_time(text),
            expiration: self.expiration(text),
        };
        debug!(?parsed, "Parsed notification");
        parsed
    }
}
