//! Vendor API configuration.

use serde::{Deserialize, Serialize};

/// Vendor telemetry API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the vendor API (e.g., "https://api.vendor.example").
    #[serde(default)]
    pub base_url: String,
    /// Bearer credential for the vendor API.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// The scheduled-pull worker only runs when a base URL is configured.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }
}
