//! Internal metrics collection.
//!
//! Counters accumulate in-process and are exposed through the health
//! endpoint; nothing here talks to the network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking, in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last.
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

/// Collected metrics for the telemetry pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingestion
    pub records_received: Counter,
    pub records_rejected: Counter,
    pub readings_appended: Counter,
    pub readings_deduplicated: Counter,

    // Alerts
    pub alerts_raised: Counter,
    pub alerts_cleared: Counter,

    // Analytics
    pub recalc_runs: Counter,
    pub recalc_failures: Counter,

    // Vendor provider
    pub provider_fetches: Counter,
    pub provider_errors: Counter,

    // Latency
    pub ingest_latency_ms: Histogram,
    pub recalc_latency_ms: Histogram,
}

impl Metrics {
    /// Point-in-time copy for the health endpoint.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.get(),
            records_rejected: self.records_rejected.get(),
            readings_appended: self.readings_appended.get(),
            readings_deduplicated: self.readings_deduplicated.get(),
            alerts_raised: self.alerts_raised.get(),
            alerts_cleared: self.alerts_cleared.get(),
            recalc_runs: self.recalc_runs.get(),
            recalc_failures: self.recalc_failures.get(),
            provider_fetches: self.provider_fetches.get(),
            provider_errors: self.provider_errors.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            recalc_latency_mean_ms: self.recalc_latency_ms.mean(),
            taken_at: Utc::now(),
        }
    }
}

/// Serializable snapshot of the metrics registry.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub records_rejected: u64,
    pub readings_appended: u64,
    pub readings_deduplicated: u64,
    pub alerts_raised: u64,
    pub alerts_cleared: u64,
    pub recalc_runs: u64,
    pub recalc_failures: u64,
    pub provider_fetches: u64,
    pub provider_errors: u64,
    pub ingest_latency_mean_ms: f64,
    pub recalc_latency_mean_ms: f64,
    pub taken_at: DateTime<Utc>,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Global metrics registry.
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::default)
}
