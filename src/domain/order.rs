//! Order, result and balance types exchanged with the broker.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::id::{Asset, OrderId};

/// Account balance as reported by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: Decimal,
    pub currency: String,
    pub is_demo: bool,
}

impl Balance {
    /// A balance is usable for decisions only when strictly positive.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// A fixed-time order to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub asset: Asset,
    pub amount: Decimal,
    pub direction: Direction,
    pub duration: Duration,
}

/// Order lifecycle status as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Win,
    Lose,
    Tie,
}

impl OrderStatus {
    /// Whether the order has settled.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Acknowledgement returned when an order is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
}

/// Settlement details for a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResult {
    pub status: OrderStatus,
    pub profit: Option<Decimal>,
    pub amount: Decimal,
}
