//! Scheduled recalculation endpoint.

use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::{info, warn};

use tank_core::{SyncCounts, SyncLogEntry, SyncStatus, SyncTrigger};
use telemetry::metrics;

use crate::extractors::CronAuth;
use crate::response::{ApiError, RecalcResponse};
use crate::state::AppState;

/// POST /cron/recalculate - recompute consumption for the whole fleet.
pub async fn recalculate_handler(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> Result<Json<RecalcResponse>, ApiError> {
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = state.orchestrator.engine().recalculate_all().await?;

    let duration = start.elapsed().as_millis() as u64;
    metrics().recalc_latency_ms.observe(duration);

    // Best-effort audit row; a logging failure never changes the response.
    let entry = SyncLogEntry {
        trigger: SyncTrigger::Scheduled,
        status: SyncStatus::classify(outcome.updated, outcome.failed),
        counts: SyncCounts {
            assets: outcome.processed,
            ..Default::default()
        },
        alerts_triggered: 0,
        records_failed: outcome.failed,
        duration_ms: duration,
        error_summary: Vec::new(),
        started_at,
    };
    if let Err(e) = state.store.record_sync(&entry).await {
        warn!(error = %e, "Failed to append recalculation sync log entry");
    }

    info!(
        processed = outcome.processed,
        updated = outcome.updated,
        failed = outcome.failed,
        duration_ms = duration,
        "Recalculation triggered via endpoint"
    );

    Ok(Json(RecalcResponse {
        success: true,
        processed: outcome.processed,
        updated: outcome.updated,
        failed: outcome.failed,
        duration,
    }))
}
