//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the broker, credential store, wall clock,
//! notification parser and event sinks the orchestrator depends on.

pub mod broker;
pub mod clock;
pub mod credential;
pub mod notifier;
pub mod parser;
