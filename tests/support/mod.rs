#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use stakeladder::port::SignalService;
use stakeladder::testkit::config::entry_1059;
use stakeladder::testkit::harness::Harness;

/// Wall clock `ms` milliseconds before the 10:59 New York entry.
pub fn before_entry(ms: i64) -> DateTime<Utc> {
    entry_1059() - TimeDelta::milliseconds(ms)
}

/// Wall clock `ms` milliseconds after the 10:59 New York entry.
pub fn after_entry(ms: i64) -> DateTime<Utc> {
    entry_1059() + TimeDelta::milliseconds(ms)
}

/// Let paused time run until the gate is free. Panics after an hour of
/// simulated time.
pub async fn wait_idle(harness: &Harness) {
    for _ in 0..3600 {
        if !harness.orchestrator.status().await.gate_held {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    panic!("sequence still active after an hour");
}

/// Yield until the gate is held by a spawned submit.
pub async fn wait_held(harness: &Harness) {
    for _ in 0..1000 {
        if harness.orchestrator.gate().is_held() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("gate never acquired");
}
