//! A fully wired orchestrator over the scripted broker.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::broker::ScriptedBrokerFactory;
use super::clock::TokioClock;
use super::notifier::RecordingNotifier;
use crate::adapter::outbound::credential::StaticCredential;
use crate::application::{
    BrokerConnection, OrchestratorParts, OutcomeMonitor, SequenceGate, SequenceOrchestrator,
};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::{LogNotifier, NotifierRegistry};

pub struct Harness {
    pub orchestrator: Arc<SequenceOrchestrator>,
    pub connection: Arc<BrokerConnection>,
    pub broker: ScriptedBrokerFactory,
    pub events: RecordingNotifier,
}

impl Harness {
    /// Wire `config` against `broker`, with a wall clock that starts at
    /// `now` and advances with tokio time.
    ///
    /// # Panics
    ///
    /// On an invalid plan or time zone in `config`.
    #[must_use]
    pub fn new(config: &Config, broker: ScriptedBrokerFactory, now: DateTime<Utc>) -> Self {
        let plan = config.trading.plan().expect("valid plan");
        let connection = Arc::new(BrokerConnection::new(
            Arc::new(broker.clone()),
            Arc::new(StaticCredential::new("test-token")),
            config.broker.connection_settings(),
        ));
        let monitor = Arc::new(OutcomeMonitor::new(
            Arc::clone(&connection),
            config.monitor.settings(config.trading.payout),
        ));

        let events = RecordingNotifier::new();
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(LogNotifier));
        notifiers.register(Box::new(events.clone()));

        let parts = OrchestratorParts {
            gate: Arc::new(SequenceGate::new(plan)),
            resolver: bootstrap::build_resolver(config).expect("valid time zones"),
            connection: Arc::clone(&connection),
            monitor,
            parser: Arc::new(bootstrap::build_parser(config).expect("parser patterns")),
            clock: Arc::new(TokioClock::starting_at(now)),
            notifiers: Arc::new(notifiers),
        };
        let orchestrator = Arc::new(SequenceOrchestrator::new(
            parts,
            config.trading.sequence_settings(),
        ));

        Self {
            orchestrator,
            connection,
            broker,
            events,
        }
    }
}

/// A notification in the signal channel's format.
#[must_use]
pub fn notification(pair: &str, direction: &str, entry: &str) -> String {
    let marker = match direction.to_ascii_uppercase().as_str() {
        "SELL" | "DOWN" | "PUT" => "🟥",
        _ => "🟩",
    };
    format!("🇪🇺 {pair} 🇺🇸 OTC\n🕘 Expiration 5M\n⏺ Entry at {entry}\n{marker} {direction}\n")
}
