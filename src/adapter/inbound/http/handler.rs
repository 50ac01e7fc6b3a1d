//! Route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::response::ApiError;
use crate::port::{SequenceStatus, SignalDisposition, SignalService};

pub type AppState = Arc<dyn SignalService>;

/// `POST <webhook_path>`: the raw notification text is the body.
pub async fn trade_signal(
    State(service): State<AppState>,
    body: String,
) -> Result<Json<SignalDisposition>, ApiError> {
    info!(bytes = body.len(), "Signal received");
    match service.submit(&body).await {
        Ok(disposition) => Ok(Json(disposition)),
        Err(e) => {
            warn!(error = %e, "Signal rejected");
            Err(e.into())
        }
    }
}

/// `GET /status`
pub async fn status(State(service): State<AppState>) -> Json<SequenceStatus> {
    Json(service.status().await)
}

/// `POST /sequence/cancel`
pub async fn cancel(State(service): State<AppState>) -> Json<Value> {
    let outcome = service.cancel().await;
    Json(json!({ "status": outcome }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
