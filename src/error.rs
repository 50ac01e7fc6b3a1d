use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while turning an inbound notification into a tradeable signal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("notification body is empty")]
    EmptyBody,

    #[error("failed to parse essential trade data: missing {field}")]
    MissingField { field: &'static str },

    #[error("invalid trade direction '{0}'")]
    InvalidDirection(String),

    #[error("invalid signal entry time '{value}': {reason}")]
    InvalidEntryTime { value: String, reason: String },
}

/// Broker client failures.
#[derive(Error, Debug, Clone)]
pub enum BrokerError {
    #[error("broker not connected")]
    NotConnected,

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("sequence cancelled before the order was placed")]
    Cancelled,

    #[error("pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
