//! Trade sequence orchestration.
//!
//! Signal handling order:
//!
//! 1. Peek at the gate. A held gate answers `ignored` without suspending.
//! 2. Parse and validate the notification (input errors, no gate).
//! 3. Resolve the entry time; more than the grace window late is `skipped`.
//! 4. Make sure the broker is connected, reconnecting once (no gate), then
//!    check lateness again against the clock after the reconnect.
//! 5. Acquire the gate. Losing the race to another signal is `ignored`.
//! 6. Spawn one task for the whole sequence and wait for its first
//!    placement to answer the caller.
//!
//! The sequence task loops reconnect → place → wait → decide until the state machine
//! says the sequence is finished. Its [`SequenceGuard`] releases the gate on
//! every exit path, including abort by [`SequenceOrchestrator::cancel`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::connection::BrokerConnection;
use super::gate::{SequenceGate, SequenceGuard};
use super::monitor::{OutcomeMonitor, PlacedTrade};
use super::timing::{EntryTimeResolver, Lateness};
use crate::domain::error::DomainError;
use crate::domain::{
    Asset, Direction, OrderRequest, SequenceEnd, Signal, TradeSequenceState, Transition,
};
use crate::error::{Error, Result, SignalError};
use crate::port::{
    CancelOutcome, Clock, Event, NotificationParser, NotifierRegistry, SequenceStatus,
    SignalDisposition, SignalService, TradeEvent,
};

/// Per-trade timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSettings {
    pub trade_duration: Duration,
    /// Use the expiration carried by the signal instead of `trade_duration`.
    pub use_signal_expiration: bool,
    /// Fire this much before the resolved entry time.
    pub entry_lead: Duration,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            trade_duration: Duration::from_secs(300),
            use_signal_expiration: false,
            entry_lead: Duration::ZERO,
        }
    }
}

/// Collaborators the orchestrator drives.
pub struct OrchestratorParts {
    pub gate: Arc<SequenceGate>,
    pub resolver: EntryTimeResolver,
    pub connection: Arc<BrokerConnection>,
    pub monitor: Arc<OutcomeMonitor>,
    pub parser: Arc<dyn NotificationParser>,
    pub clock: Arc<dyn Clock>,
    pub notifiers: Arc<NotifierRegistry>,
}

type FirstPlacement = oneshot::Sender<Result<SignalDisposition>>;

pub struct SequenceOrchestrator {
    gate: Arc<SequenceGate>,
    resolver: EntryTimeResolver,
    connection: Arc<BrokerConnection>,
    monitor: Arc<OutcomeMonitor>,
    parser: Arc<dyn NotificationParser>,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    settings: SequenceSettings,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SequenceOrchestrator {
    #[must_use]
    pub fn new(parts: OrchestratorParts, settings: SequenceSettings) -> Self {
        Self {
            gate: parts.gate,
            resolver: parts.resolver,
            connection: parts.connection,
            monitor: parts.monitor,
            parser: parts.parser,
            clock: parts.clock,
            notifiers: parts.notifiers,
            settings,
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn gate(&self) -> &Arc<SequenceGate> {
        &self.gate
    }

    /// Abort any running sequence. Used on shutdown.
    pub async fn shutdown(&self) {
        if self.cancel().await == CancelOutcome::Cancelled {
            info!("Active sequence aborted on shutdown");
        }
    }

    async fn handle(&self, text: &str) -> Result<SignalDisposition> {
        if self.gate.is_held() {
            info!("Trade sequence already active, ignoring signal");
            return Ok(ignored());
        }
        if text.trim().is_empty() {
            return Err(SignalError::EmptyBody.into());
        }

        let parsed = self.parser.parse(text);
        let signal = Signal::from_parsed(&parsed)?;
        if let Some(expiration) = signal.expiration {
            info!(
                expiration_secs = expiration.as_secs(),
                applied = self.settings.use_signal_expiration,
                "Signal carries an expiration"
            );
        }

        let target = self.resolver.resolve(signal.entry_time, self.clock.now())?;
        if let Err(skipped) = self.entry_wait(&signal.asset, target) {
            return Ok(skipped);
        }

        self.connection.ensure_connected().await?;

        // The reconnect may have taken a while; measure again.
        let now = self.clock.now();
        let wait = match self.entry_wait(&signal.asset, target) {
            Ok(wait) => wait,
            Err(skipped) => return Ok(skipped),
        };

        let Some(guard) = self.gate.enter() else {
            info!("Lost the race for the sequence gate, ignoring signal");
            return Ok(ignored());
        };
        guard
            .with_state(|s| s.arm(signal.asset.clone(), signal.direction, now))
            .ok_or(Error::Cancelled)??;
        let stake = guard.with_state(|s| s.stake()).ok_or(Error::Cancelled)?;
        info!(
            asset = %signal.asset,
            direction = %signal.direction,
            entry_at = %target,
            wait_ms = millis(wait),
            "Sequence armed"
        );
        self.notifiers.notify_all(Event::SequenceStarted {
            asset: signal.asset.clone(),
            direction: signal.direction,
            stake,
        });

        let duration = match signal.expiration {
            Some(expiration) if self.settings.use_signal_expiration => expiration,
            _ => self.settings.trade_duration,
        };
        let (reply, first_placement) = oneshot::channel();
        let run = SequenceRun {
            guard,
            reply: Some(reply),
            asset: signal.asset,
            direction: signal.direction,
            duration,
            connection: Arc::clone(&self.connection),
            monitor: Arc::clone(&self.monitor),
            notifiers: Arc::clone(&self.notifiers),
        };
        let entry_delay = wait.saturating_sub(self.settings.entry_lead);
        *self.task.lock() = Some(tokio::spawn(run.execute(entry_delay)));

        first_placement.await.unwrap_or(Err(Error::Cancelled))
    }

    /// Time left until `target`, or the `skipped` answer once it is more
    /// than the grace window behind the clock.
    fn entry_wait(
        &self,
        asset: &Asset,
        target: DateTime<Tz>,
    ) -> std::result::Result<Duration, SignalDisposition> {
        match self.resolver.check_lateness(target, self.clock.now()) {
            Lateness::Wait(wait) => Ok(wait),
            Lateness::Due => Ok(Duration::ZERO),
            Lateness::Late(by) => {
                warn!(
                    asset = %asset,
                    entry_at = %target,
                    late_ms = millis(by),
                    "Signal arrived too late, skipping"
                );
                Err(SignalDisposition::Skipped {
                    message: format!(
                        "entry time {target} passed {:.1}s ago",
                        by.as_secs_f64()
                    ),
                    late_by_ms: millis(by),
                })
            }
        }
    }
}

#[async_trait]
impl SignalService for SequenceOrchestrator {
    async fn submit(&self, text: &str) -> Result<SignalDisposition> {
        self.handle(text).await
    }

    async fn status(&self) -> SequenceStatus {
        SequenceStatus {
            gate_held: self.gate.is_held(),
            connected: self.connection.is_connected().await,
            sequence: self.gate.snapshot(),
        }
    }

    async fn cancel(&self) -> CancelOutcome {
        let running = self.task.lock().take().filter(|h| !h.is_finished());
        let before = self.gate.snapshot();

        let released = match running {
            Some(handle) => {
                handle.abort();
                if let Err(e) = handle.await {
                    if !e.is_cancelled() {
                        error!(error = %e, "Sequence task failed");
                    }
                }
                true
            }
            // A sequence can hold the gate before its task is stored.
            None => self.gate.release(),
        };

        if released {
            warn!(level = before.level(), "Sequence cancelled by operator");
            self.notifiers.notify_all(Event::SequenceFinished {
                end: SequenceEnd::Cancelled,
                state: before,
            });
            CancelOutcome::Cancelled
        } else {
            CancelOutcome::Idle
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn ignored() -> SignalDisposition {
    SignalDisposition::Ignored {
        message: "trade sequence already active".to_string(),
    }
}

/// One martingale sequence, owned by its task.
struct SequenceRun {
    // Dropped before `reply` so the gate is free by the time a cancelled
    // caller wakes up.
    guard: SequenceGuard,
    reply: Option<FirstPlacement>,
    asset: Asset,
    direction: Direction,
    duration: Duration,
    connection: Arc<BrokerConnection>,
    monitor: Arc<OutcomeMonitor>,
    notifiers: Arc<NotifierRegistry>,
}

impl SequenceRun {
    async fn execute(mut self, entry_delay: Duration) {
        if !entry_delay.is_zero() {
            debug!(delay_ms = millis(entry_delay), "Waiting for entry time");
            tokio::time::sleep(entry_delay).await;
        }

        let (end, failure) = match self.drive().await {
            Ok(end) => (end, None),
            Err(e) => {
                error!(asset = %self.asset, error = %e, "Sequence aborted");
                (SequenceEnd::PlacementFailed, Some(e))
            }
        };

        let Self {
            guard,
            reply,
            notifiers,
            ..
        } = self;
        let final_state = guard.snapshot();
        guard.release();
        info!(end = %end, "Sequence finished, gate released");

        if let Some(reply) = reply {
            let _ = reply.send(Err(failure.unwrap_or(Error::Cancelled)));
        }
        if let Some(state) = final_state {
            notifiers.notify_all(Event::SequenceFinished { end, state });
        }
    }

    async fn drive(&mut self) -> Result<SequenceEnd> {
        loop {
            let (level, stake) = self.step(|s| Ok((s.level(), s.stake())))?;
            if let Err(e) = self.connection.ensure_connected().await {
                error!(asset = %self.asset, level, error = %e, "Broker unavailable for placement");
                self.step(TradeSequenceState::placement_failed)?;
                return Err(e);
            }
            let balance_before = self.balance_snapshot().await;

            let request = OrderRequest {
                asset: self.asset.clone(),
                amount: stake,
                direction: self.direction,
                duration: self.duration,
            };
            let order = match self.connection.place_order(&request).await {
                Ok(order) => order,
                Err(e) => {
                    error!(
                        asset = %self.asset,
                        level,
                        stake = %stake,
                        error = %e,
                        "Order placement failed"
                    );
                    self.step(TradeSequenceState::placement_failed)?;
                    return Err(e.into());
                }
            };
            self.step(|s| s.order_placed(order.id.clone(), balance_before))?;

            let trade = TradeEvent {
                order_id: order.id.clone(),
                asset: self.asset.clone(),
                direction: self.direction,
                level,
                stake,
            };
            self.notifiers.notify_all(Event::OrderPlaced(trade.clone()));
            if let Some(reply) = self.reply.take() {
                let _ = reply.send(Ok(SignalDisposition::Accepted {
                    order_id: order.id.clone(),
                    asset: self.asset.clone(),
                    direction: self.direction,
                    stake,
                    level,
                }));
            }

            let outcome = self
                .monitor
                .resolve(&PlacedTrade {
                    order_id: order.id,
                    stake,
                    balance_before,
                    duration: self.duration,
                })
                .await;
            let transition = self.step(|s| s.resolve(outcome))?;
            if let Some(state) = self.guard.snapshot() {
                self.notifiers.notify_all(Event::OutcomeResolved {
                    trade,
                    outcome,
                    state,
                });
            }

            match transition {
                Transition::ReEnter { level, stake } => {
                    info!(asset = %self.asset, level, stake = %stake, "Loss, re-entering");
                }
                Transition::Finished(end) => return Ok(end),
            }
        }
    }

    async fn balance_snapshot(&self) -> Option<rust_decimal::Decimal> {
        match self.connection.get_balance().await {
            Ok(Some(balance)) if balance.is_usable() => Some(balance.amount),
            Ok(_) => {
                warn!("Pre-trade balance unavailable");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read pre-trade balance");
                None
            }
        }
    }

    fn step<R>(
        &self,
        f: impl FnOnce(&mut TradeSequenceState) -> std::result::Result<R, DomainError>,
    ) -> Result<R> {
        Ok(self.guard.with_state(f).ok_or(Error::Cancelled)??)
    }
}
