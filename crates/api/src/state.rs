//! Application state shared across handlers.

use std::sync::Arc;

use pipeline::IngestOrchestrator;
use tank_core::Store;

/// Boundary credentials.
///
/// Both secrets are compared by exact string match; validating them is the
/// boundary's job and never reaches the orchestrator.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret the vendor presents as a bearer token on the webhook.
    pub webhook_secret: String,
    /// Secret for the scheduled recalculation endpoint. Falls back to the
    /// webhook secret when unset.
    pub cron_secret: Option<String>,
}

impl AuthConfig {
    /// Token accepted on `/cron/recalculate`.
    pub fn cron_token(&self) -> &str {
        self.cron_secret.as_deref().unwrap_or(&self.webhook_secret)
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub orchestrator: Arc<IngestOrchestrator>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        orchestrator: Arc<IngestOrchestrator>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            orchestrator,
            auth: Arc::new(auth),
        }
    }
}
