//! Consumption analytics engine.
//!
//! Estimates a burn rate (liters/day) and a days-remaining projection for
//! one asset from its trailing reading history, then persists both back
//! onto the asset as derived caches.
//!
//! The burn rate is the average of consecutive pairwise level drops across
//! the trailing window. Every adjacent pair stays in the denominator:
//! refill days contribute their negative diff rather than being excluded,
//! which deliberately under-estimates the rate during and after a refill.
//! A window with fewer than two readings yields a rate of 0.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tank_core::limits::ANALYTICS_WINDOW_DAYS;
use tank_core::{Asset, Error, Reading, RecalcOutcome, Result, Store};

/// Analytics configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window, in days.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    /// Worker-pool bound for fleet recalculation. Per-asset recomputation
    /// shares no state, so this only protects the backing store.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_window_days() -> i64 {
    ANALYTICS_WINDOW_DAYS
}

fn default_concurrency() -> usize {
    8
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            concurrency: default_concurrency(),
        }
    }
}

/// Recomputed derived values for one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub rolling_avg_liters_per_day: f64,
    pub days_remaining: Option<f64>,
}

/// Average consecutive pairwise level drop across readings ordered
/// newest-first. Each drop is the next-older level minus the newer one:
/// positive when the level fell (consumption), negative when it rose
/// (refill); both stay in the average.
pub fn burn_rate(readings_desc: &[Reading]) -> f64 {
    if readings_desc.len() < 2 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for pair in readings_desc.windows(2) {
        sum += pair[1].level_liters - pair[0].level_liters;
        pairs += 1;
    }

    sum / pairs as f64
}

/// Project days until empty at the given burn rate. Undefined (and so
/// `None`) when the rate is non-positive: a net refill or a flat series has
/// no meaningful time-to-empty.
pub fn days_remaining(current_level_liters: f64, rate: f64) -> Option<f64> {
    if rate <= 0.0 {
        return None;
    }
    Some((current_level_liters / rate * 10.0).round() / 10.0)
}

/// Windowed burn-rate estimator over the store.
pub struct ConsumptionEngine {
    store: Arc<dyn Store>,
    config: AnalyticsConfig,
}

impl ConsumptionEngine {
    pub fn new(store: Arc<dyn Store>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    /// Recompute and persist derived consumption fields for one asset.
    ///
    /// Fails when the asset has no readings in the window; the caller
    /// decides whether that is worth reporting.
    pub async fn recompute_asset(&self, asset: &Asset) -> Result<Estimate> {
        let until = Utc::now();
        let since = until - Duration::days(self.config.window_days);

        let mut readings = self.store.list_readings(asset.id, since, until).await?;
        if readings.is_empty() {
            return Err(Error::validation(
                "readings",
                format!("asset {} has no readings in the window", asset.external_id),
            ));
        }
        // list_readings returns ascending; the diff walk wants newest first.
        readings.reverse();

        let rate = burn_rate(&readings);
        let estimate = Estimate {
            rolling_avg_liters_per_day: rate,
            days_remaining: days_remaining(asset.current_level_liters, rate),
        };

        self.store
            .update_asset_consumption(
                asset.id,
                Some(estimate.rolling_avg_liters_per_day),
                estimate.days_remaining,
            )
            .await?;

        debug!(
            asset = %asset.external_id,
            rate = estimate.rolling_avg_liters_per_day,
            days_remaining = ?estimate.days_remaining,
            "Recomputed consumption"
        );

        Ok(estimate)
    }

    /// Recompute a specific set of assets (the batch-touched path) on the
    /// bounded pool. Returns per-asset failures without stopping the rest.
    pub async fn recompute_assets(&self, asset_ids: &[Uuid]) -> Vec<(Uuid, Error)> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks: JoinSet<(Uuid, Result<()>)> = JoinSet::new();

        for &asset_id in asset_ids {
            let store = self.store.clone();
            let config = self.config;
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let engine = ConsumptionEngine::new(store.clone(), config);
                let outcome = match store.get_asset(asset_id).await {
                    Ok(Some(asset)) => engine.recompute_asset(&asset).await.map(|_| ()),
                    Ok(None) => Err(Error::persistence(format!(
                        "asset {asset_id} vanished before recomputation"
                    ))),
                    Err(e) => Err(e),
                };
                (asset_id, outcome)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((asset_id, Err(e))) => failures.push((asset_id, e)),
                Err(e) => warn!(error = %e, "Recompute task panicked"),
            }
        }
        failures
    }

    /// Recompute every active (non-disabled) asset independently.
    ///
    /// One asset's failure increments `failed` and never stops the batch.
    pub async fn recalculate_all(&self) -> Result<RecalcOutcome> {
        let assets = self.store.list_active_assets().await?;
        let processed = assets.len();

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks: JoinSet<Result<()>> = JoinSet::new();

        for asset in assets {
            let store = self.store.clone();
            let config = self.config;
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                ConsumptionEngine::new(store, config)
                    .recompute_asset(&asset)
                    .await
                    .map(|_| ())
            });
        }

        let mut outcome = RecalcOutcome {
            processed,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => outcome.updated += 1,
                Ok(Err(e)) => {
                    outcome.failed += 1;
                    debug!(error = %e, "Asset recomputation failed");
                }
                Err(e) => {
                    outcome.failed += 1;
                    warn!(error = %e, "Recompute task panicked");
                }
            }
        }

        metrics().recalc_runs.inc();
        metrics().recalc_failures.inc_by(outcome.failed as u64);

        info!(
            processed = outcome.processed,
            updated = outcome.updated,
            failed = outcome.failed,
            "Fleet recalculation complete"
        );

        Ok(outcome)
    }
}
