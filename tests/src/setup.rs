//! Common test setup functions.

use std::sync::Arc;

use axum::Router;

use api::{router, AppState, AuthConfig};
use pipeline::{AnalyticsConfig, IngestOrchestrator};
use tank_core::{AlertThresholds, Store};

use crate::fixtures;
use crate::mocks::MemoryStore;

/// Test context over the in-memory store.
///
/// Exercises production code paths end to end: the real axum router, the
/// real orchestrator, analytics engine, and alert generator; only the
/// Postgres transport is swapped for the `MemoryStore` implementation of
/// the same `Store` trait.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub orchestrator: Arc<IngestOrchestrator>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_thresholds(AlertThresholds::default())
    }

    pub fn with_thresholds(thresholds: AlertThresholds) -> Self {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn Store> = memory.clone();

        let orchestrator = Arc::new(IngestOrchestrator::new(
            store.clone(),
            AnalyticsConfig::default(),
            thresholds,
        ));

        let state = AppState::new(
            store,
            orchestrator.clone(),
            AuthConfig {
                webhook_secret: fixtures::webhook_secret(),
                cron_secret: Some(fixtures::cron_secret()),
            },
        );

        Self {
            store: memory,
            orchestrator,
            router: router(state),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
