//! Outbound adapters (driven side).

pub mod credential;
pub mod paper;
pub mod parser;
pub mod status_file;
