//! Broker port for balance queries and fixed-time order execution.
//!
//! The broker network client is an external collaborator; the orchestrator
//! only ever sees it through [`Broker`]. Every call may fail or stall, so
//! callers wrap them in timeouts (see `application::connection`).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Balance, Order, OrderId, OrderRequest, OrderResult};
use crate::error::BrokerError;

/// Authentication token handed to [`Broker::connect`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Client for a fixed-time (binary options) broker.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Perform the authentication handshake.
    async fn connect(&self, credential: &Credential) -> Result<(), BrokerError>;

    /// Whether the underlying session is still usable.
    async fn is_connected(&self) -> bool;

    /// Current account balance. `Ok(None)` means the broker answered but had
    /// no balance to report yet.
    async fn get_balance(&self) -> Result<Option<Balance>, BrokerError>;

    /// Submit an order. Rejections surface as [`BrokerError::Rejected`].
    async fn place_order(&self, request: &OrderRequest) -> Result<Order, BrokerError>;

    /// Settlement details, or `Ok(None)` while the order is still open.
    async fn check_order_result(&self, id: &OrderId) -> Result<Option<OrderResult>, BrokerError>;

    /// Broker name for logging.
    fn name(&self) -> &'static str;
}

/// Builds fresh, unconnected broker clients.
///
/// A reconnect always starts from a new client so a dead session is never
/// reused.
pub trait BrokerFactory: Send + Sync {
    fn build(&self) -> Arc<dyn Broker>;
}
