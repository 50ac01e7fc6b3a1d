//! Notification parser configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Appended to every parsed asset symbol (`EURUSD` → `EURUSD_otc`).
    #[serde(default = "default_otc_suffix")]
    pub otc_suffix: String,
}

fn default_otc_suffix() -> String {
    "_otc".to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            otc_suffix: default_otc_suffix(),
        }
    }
}
