//! Canonical test configurations.
//!
//! Timing values are small so paused-time tests advance quickly and the
//! retry bounds stay easy to reason about.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::infrastructure::config::settings::Config;

/// 60s trades, 1s polls, 5 attempts, 10s polling cap, no settle delay.
#[must_use]
pub fn config() -> Config {
    let mut config = Config::default();
    config.trading.trade_duration_secs = 60;
    config.monitor.poll_interval_ms = 1000;
    config.monitor.max_attempts = 5;
    config.monitor.max_wait_secs = 10;
    config.monitor.settle_delay_ms = 0;
    config.broker.rpc_timeout_secs = 2;
    config.broker.startup_attempts = 2;
    config.broker.startup_retry_secs = 1;
    config
}

/// [`config`] with a different martingale plan.
#[must_use]
pub fn with_plan(initial_stake: Decimal, multiplier: Decimal, max_level: u32) -> Config {
    let mut config = config();
    config.trading.initial_stake = initial_stake;
    config.trading.multiplier = multiplier;
    config.trading.max_level = max_level;
    config
}

/// The instant `10:59` New York resolves to on 2026-06-15 (EDT), as seen
/// from the default Windhoek local zone: 14:59:00 UTC.
#[must_use]
pub fn entry_1059() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 14, 59, 0)
        .single()
        .unwrap_or_default()
}
