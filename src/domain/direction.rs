//! Trade direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Which way the trade bets the price will move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Price expected to rise (BUY / CALL).
    Up,
    /// Price expected to fall (SELL / PUT).
    Down,
}

impl Direction {
    /// Stable upper-case name used in responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" | "BUY" | "CALL" => Ok(Self::Up),
            "DOWN" | "SELL" | "PUT" => Ok(Self::Down),
            _ => Err(SignalError::InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_aliases_case_insensitively() {
        for token in ["up", "BUY", "Call"] {
            assert_eq!(token.parse::<Direction>().unwrap(), Direction::Up);
        }
        for token in ["down", "sell", "PUT"] {
            assert_eq!(token.parse::<Direction>().unwrap(), Direction::Down);
        }
    }

    #[test]
    fn rejects_unknown_token() {
        let err = "SIDEWAYS".parse::<Direction>().unwrap_err();
        assert_eq!(err, SignalError::InvalidDirection("SIDEWAYS".to_string()));
    }
}
