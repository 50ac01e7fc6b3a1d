//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`signal`]: signal intake, operator status and cancellation

pub mod signal;
