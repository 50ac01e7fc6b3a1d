//! Scripted [`Broker`] for driving sequences in tests.
//!
//! Orders settle the moment they are placed: the balance jumps straight to
//! the balance-model target for the scripted outcome, and the status result
//! becomes visible once the order's duration has elapsed on the tokio clock.
//! Every placement is recorded with its tokio instant so tests can assert
//! stakes, levels and timing.
//!
//! Fault knobs: failing placements, an unavailable balance, failing or slow
//! connects and a hanging `get_balance`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::time::Instant;

use crate::domain::{Balance, Direction, Order, OrderId, OrderRequest, OrderResult, OrderStatus};
use crate::error::BrokerError;
use crate::port::{Broker, BrokerFactory, Credential};

/// One recorded placement.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order_id: OrderId,
    pub asset: String,
    pub direction: Direction,
    pub amount: Decimal,
    pub duration: Duration,
    pub at: Instant,
}

struct Script {
    balance: Decimal,
    payout: Decimal,
    outcomes: VecDeque<OrderStatus>,
    failing_placements: u32,
    failing_connects: u32,
    connect_delay: Duration,
    balance_unavailable: bool,
    hang_balance: bool,
    placements: Vec<Placement>,
    results: HashMap<OrderId, (Instant, OrderResult)>,
    next_id: u32,
}

/// Factory handing out sessions over one scripted account.
#[derive(Clone)]
pub struct ScriptedBrokerFactory {
    script: Arc<Mutex<Script>>,
    connects: Arc<AtomicU32>,
    builds: Arc<AtomicU32>,
    epoch: Arc<AtomicU32>,
}

impl ScriptedBrokerFactory {
    /// Account with the given balance and payout ratio. Unscripted
    /// placements lose.
    pub fn new(balance: Decimal, payout: Decimal) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                balance,
                payout,
                outcomes: VecDeque::new(),
                failing_placements: 0,
                failing_connects: 0,
                connect_delay: Duration::ZERO,
                balance_unavailable: false,
                hang_balance: false,
                placements: Vec::new(),
                results: HashMap::new(),
                next_id: 1,
            })),
            connects: Arc::new(AtomicU32::new(0)),
            builds: Arc::new(AtomicU32::new(0)),
            epoch: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.script.lock().outcomes.extend(outcomes);
        self
    }

    /// Reject the next `n` placements.
    pub fn fail_placements(&self, n: u32) {
        self.script.lock().failing_placements = n;
    }

    /// Fail the next `n` connects.
    pub fn fail_connects(&self, n: u32) {
        self.script.lock().failing_connects = n;
    }

    /// Make every connect take `delay` of tokio time.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.script.lock().connect_delay = delay;
    }

    /// Report no balance.
    pub fn set_balance_unavailable(&self, unavailable: bool) {
        self.script.lock().balance_unavailable = unavailable;
    }

    /// Make `get_balance` never return.
    pub fn set_hang_balance(&self, hang: bool) {
        self.script.lock().hang_balance = hang;
    }

    /// Overwrite the balance.
    pub fn set_balance(&self, balance: Decimal) {
        self.script.lock().balance = balance;
    }

    pub fn push_outcome(&self, outcome: OrderStatus) {
        self.script.lock().outcomes.push_back(outcome);
    }

    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.script.lock().balance
    }

    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        self.script.lock().placements.clone()
    }

    /// Successful and failed connect calls.
    #[must_use]
    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    /// Sessions built so far.
    #[must_use]
    pub fn build_count(&self) -> u32 {
        self.builds.load(Ordering::SeqCst)
    }

    /// Drop every session's connection, as if the broker hung up.
    pub fn disconnect_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl BrokerFactory for ScriptedBrokerFactory {
    fn build(&self) -> Arc<dyn Broker> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(ScriptedBroker {
            script: Arc::clone(&self.script),
            connects: Arc::clone(&self.connects),
            connected: AtomicBool::new(false),
            session_epoch: AtomicU32::new(0),
            epoch: Arc::clone(&self.epoch),
        })
    }
}

/// One scripted session.
pub struct ScriptedBroker {
    script: Arc<Mutex<Script>>,
    connects: Arc<AtomicU32>,
    connected: AtomicBool,
    session_epoch: AtomicU32,
    epoch: Arc<AtomicU32>,
}

impl ScriptedBroker {
    fn live(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
            && self.session_epoch.load(Ordering::SeqCst) == self.epoch.load(Ordering::SeqCst)
    }

    fn require_connected(&self) -> Result<(), BrokerError> {
        if self.live() {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }
}

#[async_trait]
impl Broker for ScriptedBroker {
    async fn connect(&self, _credential: &Credential) -> Result<(), BrokerError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let delay = self.script.lock().connect_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        {
            let mut script = self.script.lock();
            if script.failing_connects > 0 {
                script.failing_connects -= 1;
                return Err(BrokerError::Transport("scripted connect failure".to_string()));
            }
        }
        self.session_epoch
            .store(self.epoch.load(Ordering::SeqCst), Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.live()
    }

    async fn get_balance(&self) -> Result<Option<Balance>, BrokerError> {
        self.require_connected()?;
        let (hang, unavailable, amount) = {
            let script = self.script.lock();
            (script.hang_balance, script.balance_unavailable, script.balance)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if unavailable {
            return Ok(None);
        }
        Ok(Some(Balance {
            amount,
            currency: "USD".to_string(),
            is_demo: true,
        }))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order, BrokerError> {
        self.require_connected()?;
        let mut script = self.script.lock();
        if script.failing_placements > 0 {
            script.failing_placements -= 1;
            return Err(BrokerError::Rejected("scripted rejection".to_string()));
        }

        let id = OrderId::new(format!("order-{}", script.next_id));
        script.next_id += 1;
        let status = script.outcomes.pop_front().unwrap_or(OrderStatus::Lose);
        let stake = request.amount;
        let profit = match status {
            OrderStatus::Win => stake * script.payout,
            OrderStatus::Lose => -stake,
            OrderStatus::Tie | OrderStatus::Pending => Decimal::ZERO,
        };
        script.balance = match status {
            OrderStatus::Win => script.balance + stake + profit,
            _ => script.balance + profit,
        };

        let now = Instant::now();
        script.placements.push(Placement {
            order_id: id.clone(),
            asset: request.asset.as_str().to_string(),
            direction: request.direction,
            amount: stake,
            duration: request.duration,
            at: now,
        });
        script.results.insert(
            id.clone(),
            (
                now + request.duration,
                OrderResult {
                    status,
                    profit: Some(profit),
                    amount: stake,
                },
            ),
        );
        Ok(Order {
            id,
            status: OrderStatus::Pending,
        })
    }

    async fn check_order_result(&self, id: &OrderId) -> Result<Option<OrderResult>, BrokerError> {
        self.require_connected()?;
        let script = self.script.lock();
        Ok(script
            .results
            .get(id)
            .filter(|(settles_at, _)| Instant::now() >= *settles_at)
            .map(|(_, result)| result.clone()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
