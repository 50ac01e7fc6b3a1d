//! Outcome monitor.
//!
//! After an order is placed the monitor sleeps for the trade duration, then
//! decides win, loss or tie with one of two policies:
//!
//! - [`OutcomePolicy::BalanceDelta`] polls the balance and matches it
//!   against the loss and win targets of [`BalanceModel`].
//! - [`OutcomePolicy::Status`] polls the broker's settlement status.
//!
//! Each poll goes through the shared connection and reconnects once if the
//! session is gone. Both are bounded by a [`RetryPolicy`]. Broker errors, missing data and
//! exhaustion all resolve to [`Outcome::Uncertain`], which the state machine
//! treats as a loss. `resolve` never fails and never waits unboundedly.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::connection::BrokerConnection;
use super::retry::{Attempt, RetryPolicy};
use crate::domain::{BalanceModel, OrderId, Outcome};

/// How a trade's outcome is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePolicy {
    #[default]
    BalanceDelta,
    Status,
}

impl OutcomePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceDelta => "balance_delta",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub policy: OutcomePolicy,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub max_wait: Duration,
    pub tolerance: Decimal,
    pub payout: Decimal,
    /// Extra wait after the nominal duration before the first poll.
    pub settle_delay: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            policy: OutcomePolicy::BalanceDelta,
            poll_interval: Duration::from_secs(1),
            max_attempts: 10,
            max_wait: Duration::from_secs(30),
            tolerance: Decimal::new(1, 2),
            payout: Decimal::new(8, 1),
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// A placed trade awaiting its outcome.
#[derive(Debug, Clone)]
pub struct PlacedTrade {
    pub order_id: OrderId,
    pub stake: Decimal,
    pub balance_before: Option<Decimal>,
    pub duration: Duration,
}

pub struct OutcomeMonitor {
    connection: Arc<BrokerConnection>,
    settings: MonitorSettings,
}

impl OutcomeMonitor {
    pub fn new(connection: Arc<BrokerConnection>, settings: MonitorSettings) -> Self {
        Self {
            connection,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Wait out the trade and decide its outcome.
    pub async fn resolve(&self, trade: &PlacedTrade) -> Outcome {
        debug!(
            order_id = %trade.order_id,
            duration_secs = trade.duration.as_secs(),
            "Waiting for trade to expire"
        );
        tokio::time::sleep(trade.duration + self.settings.settle_delay).await;

        let outcome = match self.settings.policy {
            OutcomePolicy::BalanceDelta => self.by_balance(trade).await,
            OutcomePolicy::Status => self.by_status(&trade.order_id).await,
        };
        info!(
            order_id = %trade.order_id,
            policy = self.settings.policy.as_str(),
            outcome = %outcome,
            "Trade outcome decided"
        );
        outcome
    }

    async fn by_balance(&self, trade: &PlacedTrade) -> Outcome {
        let Some(before) = trade.balance_before else {
            warn!(order_id = %trade.order_id, "No pre-trade balance, assuming loss");
            return Outcome::Uncertain;
        };
        let model = BalanceModel::expected(before, trade.stake, self.settings.payout);
        let tolerance = self.settings.tolerance;
        let connection = self.connection.as_ref();

        let policy = RetryPolicy::fixed(self.settings.poll_interval, self.settings.max_attempts)
            .with_max_elapsed(self.settings.max_wait);
        let decided = policy
            .run(|_| async move {
                if let Err(e) = connection.ensure_connected().await {
                    return Attempt::Retry(e.to_string());
                }
                match connection.get_balance().await {
                    Ok(Some(balance)) if balance.is_usable() => {
                        match model.classify(balance.amount, tolerance) {
                            Some(outcome) => Attempt::Done(outcome),
                            None => Attempt::Retry(format!(
                                "balance {} matches neither loss {} nor win {}",
                                balance.amount, model.loss, model.win
                            )),
                        }
                    }
                    Ok(_) => Attempt::Retry("balance unavailable".to_string()),
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            })
            .await;

        decided.unwrap_or_else(|e| {
            warn!(
                order_id = %trade.order_id,
                attempts = e.attempts,
                reason = %e.last_reason,
                "Could not confirm outcome from balance, assuming loss"
            );
            Outcome::Uncertain
        })
    }

    async fn by_status(&self, order_id: &OrderId) -> Outcome {
        let connection = self.connection.as_ref();
        let policy = RetryPolicy::fixed(self.settings.poll_interval, u32::MAX)
            .with_max_elapsed(self.settings.max_wait);
        let decided = policy
            .run(|_| async move {
                if let Err(e) = connection.ensure_connected().await {
                    return Attempt::Retry(e.to_string());
                }
                match connection.check_order_result(order_id).await {
                    Ok(Some(result)) => match Outcome::from_status(result.status) {
                        Some(outcome) => Attempt::Done(outcome),
                        None => Attempt::Retry("order still pending".to_string()),
                    },
                    Ok(None) => Attempt::Retry("order result not available".to_string()),
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            })
            .await;

        decided.unwrap_or_else(|e| {
            warn!(
                order_id = %order_id,
                attempts = e.attempts,
                reason = %e.last_reason,
                "Order did not settle in time, assuming loss"
            );
            Outcome::Uncertain
        })
    }
}
