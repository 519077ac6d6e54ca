//! HTTP client for the vendor telemetry API.

use std::time::Duration;

use serde_json::Value;
use telemetry::metrics;
use tracing::{debug, warn};
use url::Url;

use tank_core::{Error, Result, VendorPayload};

/// Client for the vendor's tank telemetry endpoint.
#[derive(Clone)]
pub struct ProviderClient {
    base_url: Url,
    api_token: Option<String>,
    http_client: reqwest::Client,
}

impl ProviderClient {
    /// Build a client from configuration. Fails when the base URL does not
    /// parse; a missing URL is caught earlier by `ProviderConfig::is_configured`.
    pub fn new(config: &crate::ProviderConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::configuration(format!("invalid provider base url: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_token: config.api_token.clone(),
            http_client,
        })
    }

    /// Fetch the latest batch of tank records.
    ///
    /// Returns the raw payload untouched; normalization happens inside the
    /// orchestrator exactly as it does for pushed batches.
    pub async fn fetch_latest(&self) -> Result<VendorPayload> {
        let url = self
            .base_url
            .join("tanks/latest")
            .map_err(|e| Error::provider(format!("invalid request url: {e}")))?;

        debug!(url = %url, "Fetching vendor telemetry");
        metrics().provider_fetches.inc();

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            metrics().provider_errors.inc();
            warn!(error = %e, "Vendor API request failed");
            Error::provider(format!("vendor API unreachable: {e}"))
        })?;

        if !response.status().is_success() {
            metrics().provider_errors.inc();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Vendor API returned error");
            return Err(Error::provider(format!("vendor API returned {status}")));
        }

        let value: Value = response.json().await.map_err(|e| {
            metrics().provider_errors.inc();
            Error::provider(format!("invalid vendor response: {e}"))
        })?;

        VendorPayload::from_value(value)
    }
}
