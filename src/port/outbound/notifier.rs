//! Notifier port for sequence lifecycle events.
//!
//! The orchestrator emits an [`Event`] at every placement, outcome decision
//! and terminal transition. Notifiers are fire-and-forget.

use rust_decimal::Decimal;

use crate::domain::{
    Asset, Direction, OrderId, Outcome, SequenceEnd, TradeSequenceState,
};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A signal was accepted and a sequence armed.
    SequenceStarted {
        asset: Asset,
        direction: Direction,
        stake: Decimal,
    },
    /// The broker accepted an order.
    OrderPlaced(TradeEvent),
    /// The outcome monitor decided a trade.
    OutcomeResolved {
        trade: TradeEvent,
        outcome: Outcome,
        state: TradeSequenceState,
    },
    /// The sequence reached a terminal transition and the gate was released.
    SequenceFinished {
        end: SequenceEnd,
        state: TradeSequenceState,
    },
}

/// A single trade within a sequence.
#[derive(Debug, Clone)]
pub struct TradeEvent {
    pub order_id: OrderId,
    pub asset: Asset,
    pub direction: Direction,
    pub level: u32,
    pub stake: Decimal,
}

/// Trait for notification handlers.
///
/// Implementations must be thread-safe and return quickly; anything slow
/// belongs on a spawned task.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// Logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::info;
        match event {
            Event::SequenceStarted {
                asset,
                direction,
                stake,
            } => {
                info!(asset = %asset, direction = %direction, stake = %stake, "Sequence started");
            }
            Event::OrderPlaced(t) => {
                info!(
                    order_id = %t.order_id,
                    asset = %t.asset,
                    direction = %t.direction,
                    level = t.level,
                    stake = %t.stake,
                    "Order placed"
                );
            }
            Event::OutcomeResolved { trade, outcome, .. } => {
                info!(
                    order_id = %trade.order_id,
                    level = trade.level,
                    stake = %trade.stake,
                    outcome = %outcome,
                    "Outcome resolved"
                );
            }
            Event::SequenceFinished { end, state } => {
                info!(end = %end, level = state.level(), "Sequence finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MartingalePlan;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier {
        count: Arc<AtomicUsize>,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _event: Event) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn finished() -> Event {
        Event::SequenceFinished {
            end: SequenceEnd::Won,
            state: TradeSequenceState::new(MartingalePlan::default()),
        }
    }

    #[test]
    fn registry_broadcasts_to_every_notifier() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));
        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));

        registry.notify_all(finished());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registry_len_and_is_empty() {
        let mut registry = NotifierRegistry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(NullNotifier));
        registry.register(Box::new(LogNotifier));
        assert_eq!(registry.len(), 2);
        registry.notify_all(finished());
    }
}
