use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal_macros::dec;
use stakeladder::application::OutcomePolicy;
use stakeladder::error::{ConfigError, Error};
use stakeladder::infrastructure::bootstrap;
use stakeladder::infrastructure::config::broker::BrokerKind;
use stakeladder::infrastructure::config::settings::Config;

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn example_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
    let config = Config::load(&path).expect("config.example.toml should load");

    assert_eq!(config.broker.kind, BrokerKind::Paper);
    assert_eq!(config.server.webhook_path, "/trade_signal");
    assert_eq!(config.timing.signal_timezone, "America/New_York");
}

#[test]
fn full_config_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
status_file = "run/status.json"

[server]
bind = "0.0.0.0:8080"
webhook_path = "/hooks/signal"

[trading]
initial_stake = 2.5
multiplier = 2.2
max_level = 3
trade_duration_secs = 120
use_signal_expiration = true
payout = 0.92
grace_secs = 3
entry_lead_ms = 250

[timing]
signal_timezone = "America/New_York"
local_timezone = "Europe/Berlin"
rollover_hour = 6

[monitor]
policy = "status"
poll_interval_ms = 500
max_attempts = 20
max_wait_secs = 15
tolerance = 0.05
settle_delay_ms = 0

[broker]
kind = "paper"
rpc_timeout_secs = 4
startup_attempts = 3
startup_retry_secs = 2
demo = true

[broker.paper]
starting_balance = 250
win_probability = 0.6

[parser]
otc_suffix = "-OTC"

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(&path).unwrap();

    assert_eq!(config.bind_addr().unwrap().port(), 8080);
    assert_eq!(config.trading.initial_stake, dec!(2.5));
    assert_eq!(config.trading.plan().unwrap().stake_for(2), dec!(12.100));
    assert!(config.trading.use_signal_expiration);
    assert_eq!(config.trading.sequence_settings().entry_lead.as_millis(), 250);
    assert_eq!(config.timing.rollover_hour, 6);
    assert_eq!(config.monitor.policy, OutcomePolicy::Status);
    assert_eq!(config.monitor.settings(config.trading.payout).payout, dec!(0.92));
    assert_eq!(config.broker.connection_settings().startup_attempts, 3);
    assert_eq!(config.broker.paper.starting_balance, dec!(250));
    assert_eq!(config.parser.otc_suffix, "-OTC");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.status_file, Some(PathBuf::from("run/status.json")));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));

    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn invalid_values_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("[trading]\ntrade_duration_secs = 0", "trade_duration_secs"),
        ("[trading]\npayout = -0.1", "payout"),
        ("[server]\nwebhook_path = \"trade_signal\"", "webhook_path"),
        ("[timing]\nlocal_timezone = \"Nowhere/Special\"", "local_timezone"),
        ("[monitor]\npoll_interval_ms = 0", "poll_interval_ms"),
        ("[broker]\nrpc_timeout_secs = 0", "rpc_timeout_secs"),
        ("[broker.paper]\nstarting_balance = 0", "starting_balance"),
    ];

    for (toml, expected) in cases {
        let path = write_config(dir.path(), toml);
        match Config::load(&path) {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, expected, "for {toml:?}");
            }
            other => panic!("expected {expected} to be rejected, got {other:?}"),
        }
    }
}

#[test]
fn unknown_broker_kind_is_a_parse_error() {
    let result = Config::parse_toml("[broker]\nkind = \"quotex\"");

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[tokio::test]
async fn status_file_is_written_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let status_path = dir.path().join("nested").join("status.json");
    let config = Config {
        status_file: Some(status_path.clone()),
        ..Config::default()
    };

    let _services = bootstrap::build(&config).unwrap();

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&status_path).unwrap()).unwrap();
    assert_eq!(snapshot["version"], "1");
    assert_eq!(snapshot["params"]["broker"], "paper");
    assert_eq!(snapshot["params"]["outcome_policy"], "balance_delta");
    assert_eq!(snapshot["sequence"]["phase"], "idle");
    assert_eq!(snapshot["totals"]["trades_resolved"], 0);
}
