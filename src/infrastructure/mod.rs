//! Infrastructure layer.
//!
//! Configuration loading, logging setup and the composition root that wires
//! adapters into the application services.
//!
//! - [`bootstrap`] - Composition root and server lifecycle
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
