//! Status file for external monitoring.
//!
//! Writes a JSON snapshot of the sequence state and the tunable parameters
//! after every decided trade and every finished sequence, so an operator
//! can watch the staircase without scraping logs.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::domain::{SequenceEnd, TradeSequenceState};
use crate::error::Result;
use crate::port::{Event, Notifier};

/// Current status file format version.
const STATUS_VERSION: &str = "1";

/// Top-level status file structure.
#[derive(Debug, Clone, Serialize)]
pub struct StatusFile {
    /// Schema version for forward compatibility.
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub pid: u32,
    pub params: StatusParams,
    /// Sequence state as of the last write.
    pub sequence: TradeSequenceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_end: Option<SequenceEnd>,
    pub totals: StatusTotals,
    pub updated_at: DateTime<Utc>,
}

/// Tunable parameters in effect.
#[derive(Debug, Clone, Serialize)]
pub struct StatusParams {
    pub initial_stake: Decimal,
    pub multiplier: Decimal,
    pub max_level: u32,
    pub payout: Decimal,
    pub trade_duration_secs: u64,
    pub outcome_policy: String,
    pub broker: String,
}

/// Counters since process start.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusTotals {
    pub trades_resolved: u64,
    pub sequences_won: u64,
    pub sequences_tied: u64,
    pub sequences_lost: u64,
    pub sequences_aborted: u64,
}

impl StatusTotals {
    fn record_end(&mut self, end: SequenceEnd) {
        match end {
            SequenceEnd::Won => self.sequences_won += 1,
            SequenceEnd::Tied => self.sequences_tied += 1,
            SequenceEnd::MaxLevelLoss => self.sequences_lost += 1,
            SequenceEnd::PlacementFailed | SequenceEnd::Cancelled => self.sequences_aborted += 1,
        }
    }
}

/// Writer for the status file.
///
/// Registered as a [`Notifier`]; write failures are logged and otherwise
/// ignored.
pub struct StatusWriter {
    path: PathBuf,
    status: Mutex<StatusFile>,
}

impl StatusWriter {
    #[must_use]
    pub fn new(path: PathBuf, params: StatusParams, sequence: TradeSequenceState) -> Self {
        let now = Utc::now();
        Self {
            path,
            status: Mutex::new(StatusFile {
                version: STATUS_VERSION.to_string(),
                started_at: now,
                pid: std::process::id(),
                params,
                sequence,
                last_end: None,
                totals: StatusTotals::default(),
                updated_at: now,
            }),
        }
    }

    /// Write the current status to the file atomically.
    ///
    /// Writes a sibling temp file, syncs it and renames it over the target.
    /// Creates the parent directory if it does not exist.
    #[allow(clippy::result_large_err)]
    pub fn write(&self) -> Result<()> {
        let json = {
            let mut status = self.status.lock();
            status.updated_at = Utc::now();
            serde_json::to_string_pretty(&*status)?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        Ok(())
    }

    /// Current in-memory snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StatusFile {
        self.status.lock().clone()
    }

    fn update(&self, f: impl FnOnce(&mut StatusFile)) {
        f(&mut self.status.lock());
        if let Err(e) = self.write() {
            warn!(path = %self.path.display(), error = %e, "Failed to write status file");
        }
    }
}

impl Notifier for StatusWriter {
    fn notify(&self, event: Event) {
        match event {
            Event::OutcomeResolved { state, .. } => self.update(|status| {
                status.sequence = state;
                status.totals.trades_resolved += 1;
            }),
            Event::SequenceFinished { end, state } => self.update(|status| {
                status.sequence = state;
                status.last_end = Some(end);
                status.totals.record_end(end);
            }),
            Event::SequenceStarted { .. } | Event::OrderPlaced(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, Direction, MartingalePlan, OrderId, Outcome};
    use crate::port::TradeEvent;
    use rust_decimal_macros::dec;

    fn params() -> StatusParams {
        StatusParams {
            initial_stake: dec!(1),
            multiplier: dec!(2),
            max_level: 2,
            payout: dec!(0.8),
            trade_duration_secs: 300,
            outcome_policy: "balance_delta".to_string(),
            broker: "paper".to_string(),
        }
    }

    fn idle() -> TradeSequenceState {
        TradeSequenceState::new(MartingalePlan::default())
    }

    fn read(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("status.json");
        let writer = StatusWriter::new(path.clone(), params(), idle());

        writer.write().unwrap();

        let json = read(&path);
        assert_eq!(json["version"], "1");
        assert_eq!(json["params"]["max_level"], 2);
        assert_eq!(json["params"]["outcome_policy"], "balance_delta");
        assert_eq!(json["sequence"]["phase"], "idle");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn outcome_and_finish_events_update_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let writer = StatusWriter::new(path.clone(), params(), idle());

        let mut state = idle();
        state
            .arm(Asset::new("EURUSD_otc"), Direction::Up, Utc::now())
            .unwrap();
        state
            .order_placed(OrderId::new("order-1"), Some(dec!(100)))
            .unwrap();
        state.resolve(Outcome::Loss).unwrap();

        writer.notify(Event::OutcomeResolved {
            trade: TradeEvent {
                order_id: OrderId::new("order-1"),
                asset: Asset::new("EURUSD_otc"),
                direction: Direction::Up,
                level: 0,
                stake: dec!(1),
            },
            outcome: Outcome::Loss,
            state: state.clone(),
        });
        let json = read(&path);
        assert_eq!(json["sequence"]["level"], 1);
        assert_eq!(json["sequence"]["last_status"], "loss");
        assert_eq!(json["totals"]["trades_resolved"], 1);

        writer.notify(Event::SequenceFinished {
            end: SequenceEnd::MaxLevelLoss,
            state,
        });
        let json = read(&path);
        assert_eq!(json["last_end"], "max_level_loss");
        assert_eq!(json["totals"]["sequences_lost"], 1);
    }

    #[test]
    fn placement_events_do_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let writer = StatusWriter::new(path.clone(), params(), idle());

        writer.notify(Event::SequenceStarted {
            asset: Asset::new("EURUSD_otc"),
            direction: Direction::Down,
            stake: dec!(1),
        });

        assert!(!path.exists());
    }
}
