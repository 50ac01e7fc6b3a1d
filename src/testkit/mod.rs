//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`broker`] - `ScriptedBrokerFactory`: scripted outcomes, fault knobs and
//!   a placement log.
//! - [`clock`] - `TokioClock` (wall time that follows paused tokio time) and
//!   `ManualClock`.
//! - [`config`] - Canonical fast test configurations.
//! - [`harness`] - A wired orchestrator over the scripted broker.
//! - [`notifier`] - `RecordingNotifier` for event assertions.

pub mod broker;
pub mod clock;
pub mod config;
pub mod harness;
pub mod notifier;
