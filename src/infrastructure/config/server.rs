//! HTTP server configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Path of the signal webhook.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_webhook_path() -> String {
    "/trade_signal".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            webhook_path: default_webhook_path(),
        }
    }
}
