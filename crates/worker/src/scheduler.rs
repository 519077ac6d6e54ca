//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use pipeline::IngestOrchestrator;
use provider::ProviderClient;
use tank_core::{Store, SyncCounts, SyncLogEntry, SyncStatus, SyncTrigger};
use telemetry::metrics;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Vendor poll interval.
    pub poll_interval: Duration,
    /// Fleet recalculation interval.
    pub recalc_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(900),    // 15 minutes
            recalc_interval: Duration::from_secs(3600), // 1 hour
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    store: Arc<dyn Store>,
    orchestrator: Arc<IngestOrchestrator>,
    provider: Option<ProviderClient>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn Store>,
        orchestrator: Arc<IngestOrchestrator>,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
            provider: None,
        }
    }

    /// Creates a scheduler that also pulls from the vendor API.
    pub fn with_provider(
        config: WorkerConfig,
        store: Arc<dyn Store>,
        orchestrator: Arc<IngestOrchestrator>,
        provider: ProviderClient,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
            provider: Some(provider),
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        if let Some(provider) = self.provider.clone() {
            let scheduler = self.clone();
            handles.push(tokio::spawn(async move {
                scheduler.run_poll_worker(provider).await;
            }));
            info!("Vendor poll worker started");
        }

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_recalc_worker().await;
        }));

        info!("Background workers started");
        handles
    }

    /// Pull the latest vendor batch and run it through the orchestrator.
    async fn run_poll_worker(&self, provider: ProviderClient) {
        let mut ticker = interval(self.config.poll_interval);

        loop {
            ticker.tick().await;

            let payload = match provider.fetch_latest().await {
                Ok(payload) => payload,
                Err(e) => {
                    telemetry::health().provider.set_unhealthy(e.to_string());
                    error!(error = %e, "Vendor poll failed");
                    continue;
                }
            };
            telemetry::health().provider.set_healthy();

            if payload.is_empty() {
                continue;
            }

            let result = self.orchestrator.run(payload, SyncTrigger::Scheduled).await;
            if result.status != SyncStatus::Success {
                warn!(
                    status = result.status.as_str(),
                    failed = result.records_failed,
                    "Scheduled ingestion finished with failures"
                );
            }
        }
    }

    /// Recompute the whole active fleet and append an audit row.
    async fn run_recalc_worker(&self) {
        let mut ticker = interval(self.config.recalc_interval);

        loop {
            ticker.tick().await;

            let started_at = Utc::now();
            let start = Instant::now();

            let outcome = match self.orchestrator.engine().recalculate_all().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Fleet recalculation failed");
                    continue;
                }
            };

            let duration_ms = start.elapsed().as_millis() as u64;
            metrics().recalc_latency_ms.observe(duration_ms);

            // Best-effort audit row, mirroring the ingestion path.
            let entry = SyncLogEntry {
                trigger: SyncTrigger::Scheduled,
                status: SyncStatus::classify(outcome.updated, outcome.failed),
                counts: SyncCounts {
                    assets: outcome.processed,
                    ..Default::default()
                },
                alerts_triggered: 0,
                records_failed: outcome.failed,
                duration_ms,
                error_summary: Vec::new(),
                started_at,
            };
            if let Err(e) = self.store.record_sync(&entry).await {
                warn!(error = %e, "Failed to append recalculation sync log entry");
            }
        }
    }
}
