//! Trade signals.
//!
//! A [`ParsedNotification`] is whatever the notification parser managed to
//! extract; any field may be absent. [`Signal::from_parsed`] turns it into a
//! validated [`Signal`] or reports the first missing or malformed field.

use std::time::Duration;

use chrono::NaiveTime;
use serde::Serialize;

use super::direction::Direction;
use super::id::Asset;
use crate::error::SignalError;

/// Raw fields extracted from a notification. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedNotification {
    /// Broker asset symbol, already normalised.
    pub asset: Option<String>,
    /// Direction keyword as written (`BUY`, `SELL`, `UP`, `DOWN`).
    pub direction: Option<String>,
    /// Entry time-of-day as written (`HH:MM`) in the signal time zone.
    pub entry_time: Option<String>,
    /// Expiration advertised by the signal, if any.
    pub expiration: Option<Duration>,
}

impl ParsedNotification {
    /// True when none of the essential fields were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asset.is_none() && self.direction.is_none() && self.entry_time.is_none()
    }
}

/// A validated trade signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub asset: Asset,
    pub direction: Direction,
    /// Time-of-day in the remote (signal) time zone.
    pub entry_time: NaiveTime,
    pub expiration: Option<Duration>,
}

impl Signal {
    /// Validate a parsed notification.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::MissingField`] when asset, direction or entry
    /// time is absent, [`SignalError::InvalidDirection`] for an unknown
    /// direction token and [`SignalError::InvalidEntryTime`] when the entry
    /// time is not `HH:MM`.
    pub fn from_parsed(parsed: &ParsedNotification) -> Result<Self, SignalError> {
        let asset = parsed
            .asset
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or(SignalError::MissingField { field: "asset" })?;
        let direction = parsed
            .direction
            .as_deref()
            .ok_or(SignalError::MissingField { field: "direction" })?
            .parse::<Direction>()?;
        let raw_time = parsed
            .entry_time
            .as_deref()
            .ok_or(SignalError::MissingField { field: "entry_time" })?;
        let entry_time = parse_time_of_day(raw_time)?;

        Ok(Self {
            asset: Asset::new(asset.trim()),
            direction,
            entry_time,
            expiration: parsed.expiration,
        })
    }
}

/// Parse an `HH:MM` time-of-day.
///
/// # Errors
///
/// Returns [`SignalError::InvalidEntryTime`] for anything else.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, SignalError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| SignalError::InvalidEntryTime {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(
        asset: Option<&str>,
        direction: Option<&str>,
        time: Option<&str>,
    ) -> ParsedNotification {
        ParsedNotification {
            asset: asset.map(str::to_string),
            direction: direction.map(str::to_string),
            entry_time: time.map(str::to_string),
            expiration: None,
        }
    }

    #[test]
    fn builds_signal_from_complete_notification() {
        let signal =
            Signal::from_parsed(&parsed(Some("EURUSD_otc"), Some("BUY"), Some("10:59"))).unwrap();
        assert_eq!(signal.asset.as_str(), "EURUSD_otc");
        assert_eq!(signal.direction, Direction::Up);
        assert_eq!(signal.entry_time, NaiveTime::from_hms_opt(10, 59, 0).unwrap());
    }

    #[test]
    fn reports_each_missing_field() {
        let cases = [
            (parsed(None, Some("BUY"), Some("10:59")), "asset"),
            (parsed(Some("EURUSD"), None, Some("10:59")), "direction"),
            (parsed(Some("EURUSD"), Some("BUY"), None), "entry_time"),
        ];
        for (input, field) in cases {
            assert_eq!(
                Signal::from_parsed(&input).unwrap_err(),
                SignalError::MissingField { field }
            );
        }
    }

    #[test]
    fn rejects_bad_time_of_day() {
        let err = Signal::from_parsed(&parsed(Some("EURUSD"), Some("SELL"), Some("25:99")))
            .unwrap_err();
        assert!(matches!(err, SignalError::InvalidEntryTime { .. }));
    }

    #[test]
    fn empty_notification_is_detected() {
        assert!(ParsedNotification::default().is_empty());
        assert!(!parsed(Some("EURUSD"), None, None).is_empty());
    }
}
