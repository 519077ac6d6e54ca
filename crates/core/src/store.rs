//! Store contracts.
//!
//! The pipeline talks to persistence exclusively through this trait so the
//! integration suite can swap an in-memory implementation for Postgres, the
//! same way the boundary tests exercise production code paths without a
//! live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Alert, AlertDraft, Asset, Location, Reading, SyncLogEntry};
use crate::normalize::{AssetDraft, LocationDraft, ReadingDraft};

/// Result of an upsert-by-external-id.
#[derive(Debug, Clone, Copy)]
pub struct Upserted {
    pub id: Uuid,
    pub created: bool,
}

/// Result of an append-if-absent.
#[derive(Debug, Clone, Copy)]
pub struct Appended {
    pub inserted: bool,
}

/// Result of replacing an asset's active alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertTransition {
    /// True when a new alert row fired (not when the same alert was
    /// already active).
    pub raised: bool,
    /// Number of superseded rows cleared.
    pub cleared: usize,
}

/// Durable storage for locations, assets, readings, alerts, and sync logs.
///
/// Every method surfaces failures as [`crate::Error::Persistence`]; a
/// failing call never poisons sibling operations in the same batch; the
/// orchestrator decides what a failure means for the run.
#[async_trait]
pub trait Store: Send + Sync {
    /// Idempotent upsert keyed by the vendor's location id. Last write wins.
    async fn upsert_location(&self, draft: &LocationDraft) -> Result<Upserted>;

    /// Idempotent upsert keyed by the vendor's asset id. Last write wins.
    /// Derived consumption fields are left untouched by this call.
    async fn upsert_asset(&self, location_id: Uuid, draft: &AssetDraft) -> Result<Upserted>;

    /// Append one reading unless a row for `(asset_id, recorded_at)` already
    /// exists. Readings are immutable; duplicates are ignored, not
    /// overwritten.
    async fn append_reading(&self, asset_id: Uuid, draft: &ReadingDraft) -> Result<Appended>;

    /// Readings for one asset in `[since, until)`, ascending by timestamp.
    async fn list_readings(
        &self,
        asset_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Reading>>;

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>>;

    async fn list_assets(&self) -> Result<Vec<Asset>>;

    /// Assets eligible for analytics: not disabled, and not owned by a
    /// disabled location.
    async fn list_active_assets(&self) -> Result<Vec<Asset>>;

    async fn list_locations(&self) -> Result<Vec<Location>>;

    /// Persist recomputed derived fields onto an asset.
    async fn update_asset_consumption(
        &self,
        asset_id: Uuid,
        rolling_avg_liters_per_day: Option<f64>,
        days_remaining: Option<f64>,
    ) -> Result<()>;

    /// Make `draft` the only active alert for the asset (or clear all when
    /// `None`). Idempotent: replacing with the already-active alert reports
    /// `raised: false` and touches nothing.
    async fn replace_alert(
        &self,
        asset_id: Uuid,
        draft: Option<AlertDraft>,
    ) -> Result<AlertTransition>;

    async fn list_alerts(&self) -> Result<Vec<Alert>>;

    /// Append one audit row. Callers treat failures as best-effort.
    async fn record_sync(&self, entry: &SyncLogEntry) -> Result<()>;
}
