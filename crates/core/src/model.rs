//! Persisted entities and sync outcomes.
//!
//! Locations and assets are created on first sighting and updated on every
//! subsequent ingestion; they are never deleted, only soft-disabled.
//! Readings are append-only and immutable once stored. Alerts are the only
//! entity with overwrite semantics: the latest evaluation wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical site owning zero-or-more tanks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    /// Identity key from the vendor.
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub customer_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Timestamp of the newest reading ingested for any asset at this site.
    pub last_telemetry_at: Option<DateTime<Utc>>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A monitored tank/sensor.
///
/// `current_level_liters <= capacity_liters` is clamped on ingestion; the
/// source value is never trusted blindly. `rolling_avg_liters_per_day` and
/// `days_remaining` are derived caches recomputed on every run, never
/// hand-edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub external_id: String,
    pub location_id: Uuid,
    pub online: bool,
    pub capacity_liters: f64,
    pub current_level_liters: f64,
    pub current_level_pct: f64,
    pub rolling_avg_liters_per_day: Option<f64>,
    pub days_remaining: Option<f64>,
    pub device_serial: Option<String>,
    pub battery_volts: Option<f64>,
    pub commodity: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One timestamped observation for an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub level_liters: f64,
    pub level_pct: f64,
    pub battery_volts: Option<f64>,
    pub temperature_c: Option<f64>,
    pub signal_strength: Option<f64>,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Why an alert fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    LowFuel,
    CriticalFuel,
    DaysRemaining,
}

impl AlertReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowFuel => "low_fuel",
            Self::CriticalFuel => "critical_fuel",
            Self::DaysRemaining => "days_remaining",
        }
    }
}

/// An active alert row, keyed by `(asset_id, reason)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub severity: AlertSeverity,
    pub reason: AlertReason,
    pub raised_at: DateTime<Utc>,
}

/// The alert the generator wants active for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDraft {
    pub severity: AlertSeverity,
    pub reason: AlertReason,
}

/// Overall outcome of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Partial,
    Error,
}

impl SyncStatus {
    /// Classify a run from its per-record tallies.
    ///
    /// `Partial` requires both a non-zero success count and a non-empty
    /// failure count; an empty batch classifies as `Success`.
    pub fn classify(succeeded: usize, failed: usize) -> Self {
        if failed == 0 {
            Self::Success
        } else if succeeded == 0 {
            Self::Error
        } else {
            Self::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

/// A warning or error produced while processing one run, tagged with the
/// zero-based index of the vendor record that caused it (when record-scoped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
    pub message: String,
}

impl SyncIssue {
    pub fn for_record(record: usize, message: impl Into<String>) -> Self {
        Self {
            record: Some(record),
            message: message.into(),
        }
    }

    pub fn run_level(message: impl Into<String>) -> Self {
        Self {
            record: None,
            message: message.into(),
        }
    }
}

/// Per-entity persistence counts for one run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncCounts {
    pub locations: usize,
    pub assets: usize,
    pub readings: usize,
}

/// Outcome of one ingestion run, returned to every boundary caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: SyncStatus,
    pub counts: SyncCounts,
    pub alerts_triggered: usize,
    pub records_ok: usize,
    pub records_failed: usize,
    pub duration_ms: u64,
    pub warnings: Vec<SyncIssue>,
    pub errors: Vec<SyncIssue>,
}

impl SyncResult {
    /// An empty successful result (nothing to do).
    pub fn empty() -> Self {
        Self {
            status: SyncStatus::Success,
            counts: SyncCounts::default(),
            alerts_triggered: 0,
            records_ok: 0,
            records_failed: 0,
            duration_ms: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// What started an ingestion or recalculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTrigger {
    Webhook,
    Scheduled,
    Manual,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }
}

/// Audit row appended (best-effort) after every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub trigger: SyncTrigger,
    pub status: SyncStatus,
    pub counts: SyncCounts,
    pub alerts_triggered: usize,
    pub records_failed: usize,
    pub duration_ms: u64,
    /// First few error messages, for at-a-glance triage.
    pub error_summary: Vec<String>,
    pub started_at: DateTime<Utc>,
}

/// Outcome of a fleet-wide consumption recalculation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecalcOutcome {
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
}
