//! Stakeladder - webhook-driven martingale trade sequencer.
//!
//! A signal notification arrives over HTTP, is parsed into an asset, a
//! direction and an entry time, and starts a fixed-ratio martingale
//! sequence: place a trade at the entry time, wait out its duration, decide
//! the outcome, and re-enter with a multiplied stake after a loss until a
//! win or the maximum level. Only one sequence runs per process.
//!
//! # Architecture
//!
//! - [`domain`] - Signals, orders, outcomes and the sequence state machine
//! - [`port`] - Traits at the external seams (broker, clock, parser,
//!   notifier) and the inbound signal service
//! - [`application`] - Sequence gate, entry-time resolver, bounded retry,
//!   broker connection, outcome monitor and the orchestrator
//! - [`adapter`] - HTTP webhook and CLI (inbound); paper broker, token
//!   store, notification parser and status file (outbound)
//! - [`infrastructure`] - Configuration, logging and bootstrap wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Scripted broker, clocks and a wired harness for
//!   integration tests
//!
//! # Example
//!
//! ```no_run
//! use stakeladder::infrastructure::bootstrap;
//! use stakeladder::infrastructure::config::Config;
//!
//! # async fn start() -> stakeladder::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! bootstrap::run(config, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
