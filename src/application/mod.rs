//! Application services (use cases).
//!
//! The sequence gate, entry-time resolver, retry primitive, outcome monitor
//! and broker connection are composed by the orchestrator, which implements
//! the inbound [`SignalService`](crate::port::SignalService) port.

pub mod connection;
pub mod gate;
pub mod monitor;
pub mod orchestrator;
pub mod retry;
pub mod timing;

pub use connection::{BrokerConnection, ConnectionSettings};
pub use gate::{SequenceGate, SequenceGuard};
pub use monitor::{MonitorSettings, OutcomeMonitor, OutcomePolicy, PlacedTrade};
pub use orchestrator::{OrchestratorParts, SequenceOrchestrator, SequenceSettings};
pub use retry::{Attempt, RetryExhausted, RetryPolicy};
pub use timing::{EntryTimeResolver, Lateness};
