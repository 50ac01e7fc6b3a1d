use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stakeladder::adapter::outbound::credential::StaticCredential;
use stakeladder::application::{
    BrokerConnection, ConnectionSettings, MonitorSettings, OutcomeMonitor, OutcomePolicy,
    PlacedTrade,
};
use stakeladder::domain::{Asset, Direction, OrderId, OrderRequest, OrderStatus, Outcome};
use stakeladder::testkit::broker::ScriptedBrokerFactory;
use tokio::time::Instant;

const TRADE: Duration = Duration::from_secs(60);

fn settings(policy: OutcomePolicy) -> MonitorSettings {
    MonitorSettings {
        policy,
        poll_interval: Duration::from_secs(1),
        max_attempts: 5,
        max_wait: Duration::from_secs(10),
        tolerance: dec!(0.01),
        payout: dec!(0.8),
        settle_delay: Duration::ZERO,
    }
}

async fn connected(broker: &ScriptedBrokerFactory) -> Arc<BrokerConnection> {
    let connection = Arc::new(BrokerConnection::new(
        Arc::new(broker.clone()),
        Arc::new(StaticCredential::new("test-token")),
        ConnectionSettings::default(),
    ));
    connection.ensure_connected().await.unwrap();
    connection
}

fn new_monitor(connection: &Arc<BrokerConnection>, policy: OutcomePolicy) -> OutcomeMonitor {
    OutcomeMonitor::new(Arc::clone(connection), settings(policy))
}

async fn place(connection: &BrokerConnection, stake: Decimal) -> OrderId {
    let request = OrderRequest {
        asset: Asset::new("EURUSD_otc"),
        amount: stake,
        direction: Direction::Up,
        duration: TRADE,
    };
    connection.place_order(&request).await.unwrap().id
}

fn trade(order_id: OrderId, stake: Decimal, balance_before: Option<Decimal>) -> PlacedTrade {
    PlacedTrade {
        order_id,
        stake,
        balance_before,
        duration: TRADE,
    }
}

#[tokio::test(start_paused = true)]
async fn balance_delta_classifies_win_and_loss() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8))
        .with_outcomes([OrderStatus::Win, OrderStatus::Lose]);
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(5)).await;
    let outcome = monitor.resolve(&trade(id, dec!(5), Some(dec!(100)))).await;
    assert_eq!(outcome, Outcome::Win);
    assert_eq!(broker.balance(), dec!(109));

    let id = place(&connection, dec!(5)).await;
    let outcome = monitor.resolve(&trade(id, dec!(5), Some(dec!(109)))).await;
    assert_eq!(outcome, Outcome::Loss);
}

#[tokio::test(start_paused = true)]
async fn waits_out_the_trade_before_polling() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8));
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(1)).await;
    let start = Instant::now();
    monitor.resolve(&trade(id, dec!(1), Some(dec!(100)))).await;
    assert!(start.elapsed() >= TRADE);
    assert!(start.elapsed() < TRADE + Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn unavailable_balance_is_uncertain_within_the_bound() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8));
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(1)).await;
    broker.set_balance_unavailable(true);
    let start = Instant::now();
    let outcome = monitor.resolve(&trade(id, dec!(1), Some(dec!(100)))).await;

    assert_eq!(outcome, Outcome::Uncertain);
    assert!(outcome.is_loss());
    // Five attempts, four one-second sleeps.
    assert!(start.elapsed() <= TRADE + Duration::from_secs(4) + Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn missing_pre_trade_balance_is_uncertain() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8)).with_outcomes([OrderStatus::Win]);
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(1)).await;
    assert_eq!(monitor.resolve(&trade(id, dec!(1), None)).await, Outcome::Uncertain);
}

#[tokio::test(start_paused = true)]
async fn balance_matching_neither_target_is_uncertain() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8));
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(1)).await;
    broker.set_balance(dec!(250));
    assert_eq!(
        monitor.resolve(&trade(id, dec!(1), Some(dec!(100)))).await,
        Outcome::Uncertain
    );
}

#[tokio::test(start_paused = true)]
async fn status_policy_reads_settlement() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8))
        .with_outcomes([OrderStatus::Tie, OrderStatus::Lose, OrderStatus::Win]);
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::Status);

    for expected in [Outcome::Tie, Outcome::Loss, Outcome::Win] {
        let id = place(&connection, dec!(1)).await;
        assert_eq!(monitor.resolve(&trade(id, dec!(1), None)).await, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn status_policy_gives_up_on_unknown_order() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8));
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::Status);

    let start = Instant::now();
    let outcome = monitor
        .resolve(&trade(OrderId::new("no-such-order"), dec!(1), None))
        .await;

    assert_eq!(outcome, Outcome::Uncertain);
    assert!(start.elapsed() <= TRADE + Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn dropped_session_is_reconnected_before_polling() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8)).with_outcomes([OrderStatus::Win]);
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::Status);

    let id = place(&connection, dec!(1)).await;
    broker.disconnect_all();

    assert_eq!(monitor.resolve(&trade(id, dec!(1), None)).await, Outcome::Win);
    assert_eq!(broker.connect_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn unreachable_broker_while_polling_is_uncertain() {
    let broker = ScriptedBrokerFactory::new(dec!(100), dec!(0.8)).with_outcomes([OrderStatus::Win]);
    let connection = connected(&broker).await;
    let monitor = new_monitor(&connection, OutcomePolicy::BalanceDelta);

    let id = place(&connection, dec!(1)).await;
    broker.disconnect_all();
    broker.fail_connects(100);

    let outcome = monitor.resolve(&trade(id, dec!(1), Some(dec!(100)))).await;
    assert_eq!(outcome, Outcome::Uncertain);
    assert_eq!(broker.connect_count(), 6);
}
