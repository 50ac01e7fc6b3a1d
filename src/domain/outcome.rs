//! Trade outcomes and the balance model used to infer them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Result of a single trade as decided by the outcome monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
    /// Could not be determined; treated as a loss.
    Uncertain,
}

impl Outcome {
    /// Loss and uncertain outcomes both trigger a re-entry.
    #[must_use]
    pub const fn is_loss(self) -> bool {
        matches!(self, Self::Loss | Self::Uncertain)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Tie => "tie",
            Self::Uncertain => "uncertain",
        }
    }

    /// Map a settled broker status onto an outcome. Pending has no outcome.
    #[must_use]
    pub const fn from_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Win => Some(Self::Win),
            OrderStatus::Lose => Some(Self::Loss),
            OrderStatus::Tie => Some(Self::Tie),
            OrderStatus::Pending => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected post-trade balances for a single stake.
///
/// `loss = before - stake`, `win = before + stake + stake * payout`. The
/// payout ratio is fixed per process, so this model does not track per-asset
/// payout changes on the broker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceModel {
    pub loss: Decimal,
    pub win: Decimal,
}

impl BalanceModel {
    #[must_use]
    pub fn expected(before: Decimal, stake: Decimal, payout: Decimal) -> Self {
        Self {
            loss: before - stake,
            win: before + stake + stake * payout,
        }
    }

    /// Classify an observed balance, or `None` if it matches neither target.
    #[must_use]
    pub fn classify(&self, observed: Decimal, tolerance: Decimal) -> Option<Outcome> {
        if (observed - self.loss).abs() <= tolerance {
            Some(Outcome::Loss)
        } else if (observed - self.win).abs() <= tolerance {
            Some(Outcome::Win)
        } else {
            None
        }
    }
}
