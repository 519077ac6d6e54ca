//! Ingestion orchestrator.
//!
//! Sequences one vendor batch through normalize → persist → analyze →
//! alert → log and aggregates a single [`SyncResult`]. Per-record failures
//! are recorded and skipped, never propagated: a batch only fails outright
//! when every record in it fails. There is no retry within a run; the
//! vendor redelivers on its own schedule.
//!
//! Records persist sequentially: batches routinely repeat the same
//! location row, and sequential upserts give last-write-wins without lock
//! discipline. The analytics fan-out afterwards is bounded and parallel.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use telemetry::metrics;
use tracing::{info, warn};
use uuid::Uuid;

use tank_core::{
    normalize, AlertThresholds, NormalizedRecord, Store, SyncCounts, SyncIssue, SyncLogEntry,
    SyncResult, SyncStatus, SyncTrigger, VendorPayload,
};

use crate::alerts::AlertGenerator;
use crate::analytics::{AnalyticsConfig, ConsumptionEngine};

/// One batch's worth of running state.
#[derive(Default)]
struct RunState {
    counts: SyncCounts,
    records_ok: usize,
    records_failed: usize,
    alerts_triggered: usize,
    warnings: Vec<SyncIssue>,
    errors: Vec<SyncIssue>,
    touched: Vec<Uuid>,
    touched_set: HashSet<Uuid>,
}

impl RunState {
    fn touch(&mut self, asset_id: Uuid) {
        if self.touched_set.insert(asset_id) {
            self.touched.push(asset_id);
        }
    }
}

/// Sequences ingestion runs. One per process; cheap to clone via `Arc`.
pub struct IngestOrchestrator {
    store: Arc<dyn Store>,
    engine: ConsumptionEngine,
    alerts: AlertGenerator,
}

impl IngestOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        analytics: AnalyticsConfig,
        thresholds: AlertThresholds,
    ) -> Self {
        let engine = ConsumptionEngine::new(store.clone(), analytics);
        Self {
            store,
            engine,
            alerts: AlertGenerator::new(thresholds),
        }
    }

    pub fn engine(&self) -> &ConsumptionEngine {
        &self.engine
    }

    /// Run one batch to completion and report the aggregated outcome.
    ///
    /// Always returns a `SyncResult`; nothing record-scoped escapes as an
    /// error. Dropping the returned future stops dispatch of further
    /// records, while whatever was already awaited has completed.
    pub async fn run(&self, payload: VendorPayload, trigger: SyncTrigger) -> SyncResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let total = payload.len();

        metrics().records_received.inc_by(total as u64);
        info!(trigger = trigger.as_str(), records = total, "Ingestion run started");

        let mut state = RunState::default();

        for (index, record) in payload.records.iter().enumerate() {
            match normalize(record) {
                Ok(normalized) => {
                    for warning in &normalized.warnings {
                        state.warnings.push(SyncIssue::for_record(index, warning.clone()));
                    }
                    self.persist_record(index, &normalized, &mut state).await;
                }
                Err(e) => {
                    metrics().records_rejected.inc();
                    state.records_failed += 1;
                    state.errors.push(SyncIssue::for_record(index, e.to_string()));
                }
            }
        }

        self.analyze_and_alert(&mut state).await;

        let status = SyncStatus::classify(state.records_ok, state.records_failed);
        let duration_ms = start.elapsed().as_millis() as u64;
        metrics().ingest_latency_ms.observe(duration_ms);

        let result = SyncResult {
            status,
            counts: state.counts,
            alerts_triggered: state.alerts_triggered,
            records_ok: state.records_ok,
            records_failed: state.records_failed,
            duration_ms,
            warnings: state.warnings,
            errors: state.errors,
        };

        self.record_sync_log(trigger, started_at, &result).await;

        info!(
            trigger = trigger.as_str(),
            status = result.status.as_str(),
            ok = result.records_ok,
            failed = result.records_failed,
            readings = result.counts.readings,
            alerts = result.alerts_triggered,
            duration_ms = result.duration_ms,
            "Ingestion run finished"
        );

        result
    }

    /// Persist one normalized record: Location, then Asset, then Reading.
    /// A persistence failure marks the record failed and the loop moves on.
    async fn persist_record(&self, index: usize, record: &NormalizedRecord, state: &mut RunState) {
        let location = match self.store.upsert_location(&record.location).await {
            Ok(upserted) => upserted,
            Err(e) => {
                self.fail_record(index, e.to_string(), state);
                return;
            }
        };
        state.counts.locations += 1;

        let asset = match self.store.upsert_asset(location.id, &record.asset).await {
            Ok(upserted) => upserted,
            Err(e) => {
                self.fail_record(index, e.to_string(), state);
                return;
            }
        };
        state.counts.assets += 1;

        match self.store.append_reading(asset.id, &record.reading).await {
            Ok(appended) if appended.inserted => {
                metrics().readings_appended.inc();
                state.counts.readings += 1;
            }
            Ok(_) => {
                metrics().readings_deduplicated.inc();
                state.warnings.push(SyncIssue::for_record(
                    index,
                    format!(
                        "duplicate reading for asset {} at {}, ignored",
                        record.asset.external_id, record.reading.recorded_at
                    ),
                ));
            }
            Err(e) => {
                self.fail_record(index, e.to_string(), state);
                return;
            }
        }

        state.records_ok += 1;
        state.touch(asset.id);
    }

    fn fail_record(&self, index: usize, message: String, state: &mut RunState) {
        metrics().records_rejected.inc();
        state.records_failed += 1;
        state.errors.push(SyncIssue::for_record(index, message));
    }

    /// Recompute consumption and re-evaluate alerts for the assets this
    /// batch touched, not the whole fleet. Failures here degrade to
    /// warnings: the readings are already durable.
    async fn analyze_and_alert(&self, state: &mut RunState) {
        if state.touched.is_empty() {
            return;
        }

        for (asset_id, error) in self.engine.recompute_assets(&state.touched).await {
            state.warnings.push(SyncIssue::run_level(format!(
                "consumption recompute failed for asset {asset_id}: {error}"
            )));
        }

        for &asset_id in &state.touched {
            match self.store.get_asset(asset_id).await {
                Ok(Some(asset)) => match self.alerts.apply(&self.store, &asset).await {
                    Ok(transition) if transition.raised => state.alerts_triggered += 1,
                    Ok(_) => {}
                    Err(e) => state.warnings.push(SyncIssue::run_level(format!(
                        "alert evaluation failed for asset {}: {e}",
                        asset.external_id
                    ))),
                },
                Ok(None) => {}
                Err(e) => state.warnings.push(SyncIssue::run_level(format!(
                    "alert evaluation failed for asset {asset_id}: {e}"
                ))),
            }
        }
    }

    /// Best-effort audit row; a logging failure never changes the result.
    async fn record_sync_log(&self, trigger: SyncTrigger, started_at: chrono::DateTime<Utc>, result: &SyncResult) {
        let entry = SyncLogEntry {
            trigger,
            status: result.status,
            counts: result.counts,
            alerts_triggered: result.alerts_triggered,
            records_failed: result.records_failed,
            duration_ms: result.duration_ms,
            error_summary: result
                .errors
                .iter()
                .take(tank_core::limits::MAX_REPORTED_ISSUES)
                .map(|issue| issue.message.clone())
                .collect(),
            started_at,
        };

        if let Err(e) = self.store.record_sync(&entry).await {
            warn!(error = %e, "Failed to append sync log entry");
        }
    }
}
