//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - HTTP webhook and CLI (driving side)
//! - [`outbound`] - Broker, credentials, parser and status file (driven side)

pub mod inbound;
pub mod outbound;
