//! Simulated broker.
//!
//! Stakes are debited at placement. Orders settle lazily once their
//! duration has elapsed: a win credits `stake × (2 + payout)`, a tie refunds
//! the stake and a loss credits nothing, which lands the balance exactly on
//! the targets of [`BalanceModel`](crate::domain::BalanceModel). Outcomes
//! come from a scripted queue when one is loaded, otherwise from a coin
//! weighted by `win_probability`.
//!
//! All clients built by one [`PaperBrokerFactory`] share the same account,
//! so a reconnect does not reset the balance.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{Balance, Order, OrderId, OrderRequest, OrderResult, OrderStatus};
use crate::error::BrokerError;
use crate::infrastructure::config::broker::PaperConfig;
use crate::port::{Broker, BrokerFactory, Credential};

struct OpenOrder {
    stake: Decimal,
    expires_at: Instant,
    outcome: OrderStatus,
}

struct Account {
    balance: Decimal,
    currency: String,
    demo: bool,
    payout: Decimal,
    win_probability: f64,
    scripted: VecDeque<OrderStatus>,
    open: HashMap<OrderId, OpenOrder>,
    settled: HashMap<OrderId, OrderResult>,
}

impl Account {
    fn next_outcome(&mut self) -> OrderStatus {
        self.scripted.pop_front().unwrap_or_else(|| {
            if rand::thread_rng().gen_bool(self.win_probability) {
                OrderStatus::Win
            } else {
                OrderStatus::Lose
            }
        })
    }

    fn settle_due(&mut self, now: Instant) {
        let due: Vec<OrderId> = self
            .open
            .iter()
            .filter(|(_, order)| order.expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in due {
            let Some(order) = self.open.remove(&id) else {
                continue;
            };
            let (credit, profit) = match order.outcome {
                OrderStatus::Win => {
                    let profit = order.stake + order.stake * self.payout;
                    (order.stake + profit, profit)
                }
                OrderStatus::Tie | OrderStatus::Pending => (order.stake, Decimal::ZERO),
                OrderStatus::Lose => (Decimal::ZERO, -order.stake),
            };
            self.balance += credit;
            debug!(
                order_id = %id,
                outcome = ?order.outcome,
                balance = %self.balance,
                "Paper order settled"
            );
            self.settled.insert(
                id,
                OrderResult {
                    status: order.outcome,
                    profit: Some(profit),
                    amount: order.stake,
                },
            );
        }
    }
}

/// Builds [`PaperBroker`] clients over one shared account.
pub struct PaperBrokerFactory {
    account: Arc<Mutex<Account>>,
}

impl PaperBrokerFactory {
    #[must_use]
    pub fn new(config: &PaperConfig, payout: Decimal, demo: bool) -> Self {
        Self {
            account: Arc::new(Mutex::new(Account {
                balance: config.starting_balance,
                currency: config.currency.clone(),
                demo,
                payout,
                win_probability: config.win_probability.clamp(0.0, 1.0),
                scripted: VecDeque::new(),
                open: HashMap::new(),
                settled: HashMap::new(),
            })),
        }
    }

    /// Queue outcomes for the next placements, in order.
    pub fn script_outcomes(&self, outcomes: impl IntoIterator<Item = OrderStatus>) {
        self.account.lock().scripted.extend(outcomes);
    }

    /// Settled balance, ignoring orders that are still open.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.account.lock().balance
    }
}

impl BrokerFactory for PaperBrokerFactory {
    fn build(&self) -> Arc<dyn Broker> {
        Arc::new(PaperBroker {
            account: Arc::clone(&self.account),
            connected: AtomicBool::new(false),
        })
    }
}

/// One simulated broker session.
pub struct PaperBroker {
    account: Arc<Mutex<Account>>,
    connected: AtomicBool,
}

impl PaperBroker {
    fn require_connected(&self) -> Result<(), BrokerError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn connect(&self, credential: &Credential) -> Result<(), BrokerError> {
        if credential.token().trim().is_empty() {
            return Err(BrokerError::Authentication("empty token".to_string()));
        }
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn get_balance(&self) -> Result<Option<Balance>, BrokerError> {
        self.require_connected()?;
        let mut account = self.account.lock();
        account.settle_due(Instant::now());
        Ok(Some(Balance {
            amount: account.balance,
            currency: account.currency.clone(),
            is_demo: account.demo,
        }))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order, BrokerError> {
        self.require_connected()?;
        if request.amount <= Decimal::ZERO {
            return Err(BrokerError::Rejected(format!(
                "invalid amount {}",
                request.amount
            )));
        }

        let now = Instant::now();
        let mut account = self.account.lock();
        account.settle_due(now);
        if request.amount > account.balance {
            return Err(BrokerError::Rejected(format!(
                "insufficient balance {} for stake {}",
                account.balance, request.amount
            )));
        }

        let id = OrderId::generate();
        let outcome = account.next_outcome();
        account.balance -= request.amount;
        account.open.insert(
            id.clone(),
            OpenOrder {
                stake: request.amount,
                expires_at: now + request.duration,
                outcome,
            },
        );
        debug!(
            order_id = %id,
            asset = %request.asset,
            direction = %request.direction,
            amount = %request.amount,
            "Paper order placed"
        );
        Ok(Order {
            id,
            status: OrderStatus::Pending,
        })
    }

    async fn check_order_result(&self, id: &OrderId) -> Result<Option<OrderResult>, BrokerError> {
        self.require_connected()?;
        let mut account = self.account.lock();
        account.settle_due(Instant::now());
        Ok(account.settled.get(id).cloned())
    }

    fn name(&self) -> &'static str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, BalanceModel, Direction, Outcome};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn factory(balance: Decimal) -> PaperBrokerFactory {
        let config = PaperConfig {
            starting_balance: balance,
            win_probability: 0.5,
            currency: "USD".to_string(),
        };
        PaperBrokerFactory::new(&config, dec!(0.8), true)
    }

    async fn connected(factory: &PaperBrokerFactory) -> Arc<dyn Broker> {
        let broker = factory.build();
        broker.connect(&Credential::new("token")).await.unwrap();
        broker
    }

    fn order(amount: Decimal) -> OrderRequest {
        OrderRequest {
            asset: Asset::new("EURUSD_otc"),
            amount,
            direction: Direction::Up,
            duration: Duration::from_secs(60),
        }
    }

    async fn balance(broker: &Arc<dyn Broker>) -> Decimal {
        broker.get_balance().await.unwrap().unwrap().amount
    }

    #[tokio::test(start_paused = true)]
    async fn settlement_lands_on_balance_model_targets() {
        let factory = factory(dec!(100));
        factory.script_outcomes([OrderStatus::Win, OrderStatus::Lose]);
        let broker = connected(&factory).await;

        let win = broker.place_order(&order(dec!(1))).await.unwrap();
        assert_eq!(balance(&broker).await, dec!(99));
        assert!(broker.check_order_result(&win.id).await.unwrap().is_none());

        tokio::time::advance(Duration::from_secs(60)).await;
        let model = BalanceModel::expected(dec!(100), dec!(1), dec!(0.8));
        assert_eq!(
            model.classify(balance(&broker).await, dec!(0.01)),
            Some(Outcome::Win)
        );
        let result = broker.check_order_result(&win.id).await.unwrap().unwrap();
        assert_eq!(result.status, OrderStatus::Win);

        let before = balance(&broker).await;
        broker.place_order(&order(dec!(2))).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(balance(&broker).await, before - dec!(2));
    }

    #[tokio::test]
    async fn rejects_unaffordable_stake() {
        let broker = connected(&factory(dec!(5))).await;
        let err = broker.place_order(&order(dec!(10))).await.unwrap_err();
        assert!(matches!(err, BrokerError::Rejected(_)));
    }

    #[tokio::test]
    async fn requires_connection_and_token() {
        let factory = factory(dec!(5));
        let broker = factory.build();
        assert!(matches!(
            broker.get_balance().await,
            Err(BrokerError::NotConnected)
        ));
        assert!(matches!(
            broker.connect(&Credential::new(" ")).await,
            Err(BrokerError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn sessions_share_one_account() {
        let factory = factory(dec!(50));
        let first = connected(&factory).await;
        first.place_order(&order(dec!(5))).await.unwrap();

        let second = connected(&factory).await;
        assert_eq!(balance(&second).await, dec!(45));
    }
}
