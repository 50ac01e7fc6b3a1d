//! Composition root: builds the adapters and services from configuration
//! and runs the webhook server.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::inbound::http;
use crate::adapter::outbound::credential::{StaticCredential, TokenStore};
use crate::adapter::outbound::paper::PaperBrokerFactory;
use crate::adapter::outbound::parser::RegexNotificationParser;
use crate::adapter::outbound::status_file::{StatusParams, StatusWriter};
use crate::application::{
    BrokerConnection, EntryTimeResolver, OrchestratorParts, OutcomeMonitor, SequenceGate,
    SequenceOrchestrator,
};
use crate::domain::{MartingalePlan, TradeSequenceState};
use crate::error::Result;
use crate::infrastructure::config::broker::BrokerKind;
use crate::infrastructure::config::settings::Config;
use crate::port::{
    BrokerFactory, Clock, CredentialSource, LogNotifier, NotifierRegistry, SignalService,
    SystemClock,
};

/// Everything the server needs, wired.
pub struct Services {
    pub orchestrator: Arc<SequenceOrchestrator>,
    pub connection: Arc<BrokerConnection>,
}

/// Broker side of the wiring, swappable in tests.
pub struct BrokerWiring {
    pub factory: Arc<dyn BrokerFactory>,
    pub credentials: Arc<dyn CredentialSource>,
}

/// Build the entry-time resolver.
///
/// # Errors
///
/// Fails on an unknown time zone.
#[allow(clippy::result_large_err)]
pub fn build_resolver(config: &Config) -> Result<EntryTimeResolver> {
    Ok(EntryTimeResolver::new(
        config.timing.signal_tz()?,
        config.timing.local_tz()?,
        config.timing.rollover_hour,
        config.trading.grace(),
    ))
}

/// Build the notification parser.
///
/// # Errors
///
/// Fails only if a built-in pattern does not compile.
#[allow(clippy::result_large_err)]
pub fn build_parser(config: &Config) -> Result<RegexNotificationParser> {
    Ok(RegexNotificationParser::new(config.parser.otc_suffix.clone())?)
}

/// Broker client factory and credential source for `broker.kind`.
#[must_use]
pub fn build_broker(config: &Config) -> BrokerWiring {
    match config.broker.kind {
        BrokerKind::Paper => {
            let factory = PaperBrokerFactory::new(
                &config.broker.paper,
                config.trading.payout,
                config.broker.demo,
            );
            let store = TokenStore::new(config.broker.token_file.clone());
            let credentials: Arc<dyn CredentialSource> = if store.is_configured() {
                Arc::new(store)
            } else {
                Arc::new(StaticCredential::new("paper"))
            };
            info!(
                starting_balance = %config.broker.paper.starting_balance,
                win_probability = config.broker.paper.win_probability,
                "Using paper broker"
            );
            BrokerWiring {
                factory: Arc::new(factory),
                credentials,
            }
        }
    }
}

/// Build the notifier registry: logging always, the status file when set.
pub(crate) fn build_notifier_registry(config: &Config, plan: MartingalePlan) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if let Some(path) = &config.status_file {
        let params = StatusParams {
            initial_stake: plan.initial_stake(),
            multiplier: plan.multiplier(),
            max_level: plan.max_level(),
            payout: config.trading.payout,
            trade_duration_secs: config.trading.trade_duration_secs,
            outcome_policy: config.monitor.policy.as_str().to_string(),
            broker: config.broker.kind.as_str().to_string(),
        };
        let writer = StatusWriter::new(path.clone(), params, TradeSequenceState::new(plan));
        if let Err(e) = writer.write() {
            warn!(path = %path.display(), error = %e, "Initial status file write failed");
        }
        info!(path = %path.display(), "Status file enabled");
        registry.register(Box::new(writer));
    }

    registry
}

/// Wire the services with the given broker and clock.
///
/// # Errors
///
/// Fails on invalid plan or time zone values.
#[allow(clippy::result_large_err)]
pub fn build_services(
    config: &Config,
    broker: BrokerWiring,
    clock: Arc<dyn Clock>,
) -> Result<Services> {
    let plan = config.trading.plan()?;
    let connection = Arc::new(BrokerConnection::new(
        broker.factory,
        broker.credentials,
        config.broker.connection_settings(),
    ));
    let monitor = Arc::new(OutcomeMonitor::new(
        Arc::clone(&connection),
        config.monitor.settings(config.trading.payout),
    ));

    let parts = OrchestratorParts {
        gate: Arc::new(SequenceGate::new(plan)),
        resolver: build_resolver(config)?,
        connection: Arc::clone(&connection),
        monitor,
        parser: Arc::new(build_parser(config)?),
        clock,
        notifiers: Arc::new(build_notifier_registry(config, plan)),
    };
    let orchestrator = Arc::new(SequenceOrchestrator::new(
        parts,
        config.trading.sequence_settings(),
    ));

    Ok(Services {
        orchestrator,
        connection,
    })
}

/// Wire the production services.
///
/// # Errors
///
/// See [`build_services`].
#[allow(clippy::result_large_err)]
pub fn build(config: &Config) -> Result<Services> {
    build_services(config, build_broker(config), Arc::new(SystemClock))
}

/// Connect with the startup retry budget and log the balance. A failure is
/// logged; the first signal will reconnect.
pub async fn connect_at_startup(connection: &BrokerConnection) {
    match connection.connect_with_retries().await {
        Ok(_) => match connection.get_balance().await {
            Ok(Some(balance)) => info!(
                balance = %balance.amount,
                currency = %balance.currency,
                demo = balance.is_demo,
                "Broker ready"
            ),
            Ok(None) => warn!("Broker connected but balance is unavailable"),
            Err(e) => warn!(error = %e, "Broker connected but balance read failed"),
        },
        Err(e) => warn!(error = %e, "Broker unavailable at startup, will retry on first signal"),
    }
}

/// Run the webhook server until `shutdown` resolves. An active sequence is
/// cancelled before the server drains, so no request waits on it.
///
/// # Errors
///
/// Fails on wiring errors or if the server cannot bind.
pub async fn run(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = config.bind_addr()?;
    let services = build(&config)?;
    connect_at_startup(&services.connection).await;

    let service: Arc<dyn SignalService> = services.orchestrator.clone();
    let app = http::router(service, &config.server.webhook_path);

    let orchestrator = Arc::clone(&services.orchestrator);
    let drain = async move {
        shutdown.await;
        info!("Shutdown requested");
        orchestrator.shutdown().await;
    };

    http::serve(addr, app, drain).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_status_writer_only_when_configured() {
        let config = Config::default();
        let registry = build_notifier_registry(&config, MartingalePlan::default());
        assert_eq!(registry.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let config = Config {
            status_file: Some(path.clone()),
            ..Config::default()
        };
        let registry = build_notifier_registry(&config, MartingalePlan::default());
        assert_eq!(registry.len(), 2);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn production_wiring_connects_to_paper_broker() {
        let services = build(&Config::default()).unwrap();
        connect_at_startup(&services.connection).await;
        assert!(services.connection.is_connected().await);

        let status = services.orchestrator.status().await;
        assert!(!status.gate_held);
        assert!(status.connected);
    }
}
