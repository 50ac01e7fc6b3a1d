//! HTTP webhook and operator endpoints.
//!
//! - `POST <webhook_path>` - submit a raw signal notification
//! - `GET /status` - sequence snapshot, gate and connection flags
//! - `POST /sequence/cancel` - abort the active sequence
//! - `GET /health` - liveness

pub mod handler;
pub mod response;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use handler::AppState;
pub use response::{ApiError, ErrorBody};

use crate::error::{Error, Result};

/// Build the router.
pub fn router(service: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handler::trade_signal))
        .route("/status", get(handler::status))
        .route("/sequence/cancel", post(handler::cancel))
        .route("/health", get(handler::health))
        .with_state(service)
}

/// Bind and serve until `shutdown` resolves.
///
/// # Errors
///
/// Fails if the address cannot be bound or the server errors out.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        Error::Connection(format!("failed to bind {addr}: {e}"))
    })?;
    info!(addr = %addr, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server stopped");
    Ok(())
}
