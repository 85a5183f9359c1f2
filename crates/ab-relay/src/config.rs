//! Relay configuration

use serde::{Deserialize, Serialize};

/// Relay tunables. Missing JSON fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Wait after injecting the content script before resending
    pub settle_interval_ms: u64,
    /// Upper bound on waiting for a content reply
    pub reply_timeout_ms: u64,
    /// Extension file injected into tabs on demand
    pub content_script: String,
    /// Extension file the content script loads into the page realm
    pub injected_script: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: 100,
            reply_timeout_ms: 5000,
            content_script: "content.js".to_string(),
            injected_script: "injected.js".to_string(),
        }
    }
}
