//! Shared broker connection.
//!
//! One handle per process. Reconnects are serialised by an async mutex and
//! always start from a freshly built client; while a reconnect is running,
//! or after one failed, the handle is empty so callers reconnect instead of
//! reusing a dead session. Every RPC is bounded by `rpc_timeout`, and an RPC
//! that times out or finds the session gone empties the handle too.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use super::retry::{Attempt, RetryPolicy};
use crate::domain::{Balance, Order, OrderId, OrderRequest, OrderResult};
use crate::error::{BrokerError, Error, Result};
use crate::port::{Broker, BrokerFactory, CredentialSource};

/// Timeouts and startup retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub rpc_timeout: Duration,
    pub startup_attempts: u32,
    pub startup_retry: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(10),
            startup_attempts: 10,
            startup_retry: Duration::from_secs(5),
        }
    }
}

pub struct BrokerConnection {
    factory: Arc<dyn BrokerFactory>,
    credentials: Arc<dyn CredentialSource>,
    handle: RwLock<Option<Arc<dyn Broker>>>,
    reconnect: Mutex<()>,
    settings: ConnectionSettings,
}

impl BrokerConnection {
    pub fn new(
        factory: Arc<dyn BrokerFactory>,
        credentials: Arc<dyn CredentialSource>,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            factory,
            credentials,
            handle: RwLock::new(None),
            reconnect: Mutex::new(()),
            settings,
        }
    }

    /// Whether a live session is available right now.
    pub async fn is_connected(&self) -> bool {
        match self.current() {
            Some(broker) => self.probe(broker.as_ref()).await,
            None => false,
        }
    }

    /// Return the live session, reconnecting once if it is missing or dead.
    ///
    /// Concurrent callers queue on the reconnect lock; whoever gets it second
    /// reuses the session the first one established.
    ///
    /// # Errors
    ///
    /// [`Error::Credential`] if no token is available, [`Error::Connection`]
    /// if the handshake fails or times out.
    pub async fn ensure_connected(&self) -> Result<Arc<dyn Broker>> {
        if let Some(broker) = self.current() {
            if self.probe(broker.as_ref()).await {
                return Ok(broker);
            }
        }

        let _reconnecting = self.reconnect.lock().await;
        if let Some(broker) = self.current() {
            if self.probe(broker.as_ref()).await {
                return Ok(broker);
            }
        }
        self.reconnect_locked().await
    }

    /// Connect at startup, retrying `startup_attempts` times.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] once every attempt has failed.
    pub async fn connect_with_retries(&self) -> Result<Arc<dyn Broker>> {
        let policy =
            RetryPolicy::fixed(self.settings.startup_retry, self.settings.startup_attempts);
        policy
            .run(|attempt| async move {
                match self.ensure_connected().await {
                    Ok(broker) => Attempt::Done(broker),
                    Err(e) => {
                        warn!(attempt, error = %e, "Broker connection attempt failed");
                        Attempt::Retry(e.to_string())
                    }
                }
            })
            .await
            .map_err(|e| Error::Connection(e.to_string()))
    }

    pub async fn get_balance(&self) -> std::result::Result<Option<Balance>, BrokerError> {
        let broker = self.broker()?;
        let result = self.timed("get_balance", broker.get_balance()).await;
        self.drop_if_dead(&broker, result)
    }

    pub async fn place_order(
        &self,
        request: &OrderRequest,
    ) -> std::result::Result<Order, BrokerError> {
        let broker = self.broker()?;
        let result = self.timed("place_order", broker.place_order(request)).await;
        self.drop_if_dead(&broker, result)
    }

    pub async fn check_order_result(
        &self,
        id: &OrderId,
    ) -> std::result::Result<Option<OrderResult>, BrokerError> {
        let broker = self.broker()?;
        let result = self
            .timed("check_order_result", broker.check_order_result(id))
            .await;
        self.drop_if_dead(&broker, result)
    }

    /// Drop the current session; the next caller reconnects.
    pub fn invalidate(&self) {
        *self.handle.write() = None;
    }

    /// Clear the handle when `broker` turned out to be dead, unless another
    /// caller already replaced it.
    fn drop_if_dead<T>(
        &self,
        broker: &Arc<dyn Broker>,
        result: std::result::Result<T, BrokerError>,
    ) -> std::result::Result<T, BrokerError> {
        if let Err(e) = &result {
            if matches!(e, BrokerError::NotConnected | BrokerError::Timeout { .. }) {
                let mut handle = self.handle.write();
                if handle.as_ref().is_some_and(|current| Arc::ptr_eq(current, broker)) {
                    *handle = None;
                    warn!(broker = broker.name(), error = %e, "Broker session dropped");
                }
            }
        }
        result
    }

    fn current(&self) -> Option<Arc<dyn Broker>> {
        self.handle.read().clone()
    }

    fn broker(&self) -> std::result::Result<Arc<dyn Broker>, BrokerError> {
        self.current().ok_or(BrokerError::NotConnected)
    }

    async fn probe(&self, broker: &dyn Broker) -> bool {
        timeout(self.settings.rpc_timeout, broker.is_connected())
            .await
            .unwrap_or(false)
    }

    async fn reconnect_locked(&self) -> Result<Arc<dyn Broker>> {
        self.invalidate();
        let credential = self.credentials.credential().await?;
        let broker = self.factory.build();
        info!(broker = broker.name(), "Connecting to broker");

        match self.timed("connect", broker.connect(&credential)).await {
            Ok(()) => {
                *self.handle.write() = Some(Arc::clone(&broker));
                info!(broker = broker.name(), "Broker connected");
                Ok(broker)
            }
            Err(e) => {
                warn!(broker = broker.name(), error = %e, "Broker connection failed");
                Err(Error::Connection(e.to_string()))
            }
        }
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = std::result::Result<T, BrokerError>>,
    ) -> std::result::Result<T, BrokerError> {
        timeout(self.settings.rpc_timeout, fut)
            .await
            .map_err(|_| BrokerError::Timeout {
                operation,
                secs: self.settings.rpc_timeout.as_secs(),
            })?
    }
}
