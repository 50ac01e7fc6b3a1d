//! Signal intake port driven by the webhook.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Asset, Direction, OrderId, TradeSequenceState};
use crate::error::Result;

/// Synchronous answer to an inbound signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalDisposition {
    /// A sequence was started and its first order placed.
    Accepted {
        order_id: OrderId,
        asset: Asset,
        direction: Direction,
        stake: Decimal,
        level: u32,
    },
    /// A sequence is already in flight.
    Ignored { message: String },
    /// The signal arrived past the grace window.
    Skipped { message: String, late_by_ms: u64 },
}

/// Operator view of the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceStatus {
    pub gate_held: bool,
    pub connected: bool,
    pub sequence: TradeSequenceState,
}

/// Result of an operator cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled,
    Idle,
}

/// Use cases exposed to inbound adapters.
#[async_trait]
pub trait SignalService: Send + Sync {
    /// Handle a raw notification body.
    ///
    /// # Errors
    ///
    /// Input errors, connectivity failures, placement failures and
    /// cancellation before the first placement.
    async fn submit(&self, text: &str) -> Result<SignalDisposition>;

    /// Snapshot of the sequence and connection.
    async fn status(&self) -> SequenceStatus;

    /// Abort the running sequence, if any, and release the gate.
    async fn cancel(&self) -> CancelOutcome;
}
