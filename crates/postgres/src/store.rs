//! `Store` implementation over Postgres.
//!
//! Upserts are keyed by vendor external id with last-write-wins conflict
//! handling; readings dedup on `(asset_id, recorded_at)` with
//! `ON CONFLICT DO NOTHING`. The `xmax = 0` check distinguishes fresh
//! inserts from conflict updates without a second round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tank_core::{
    Alert, AlertDraft, AlertTransition, Appended, Asset, AssetDraft, Error, Location,
    LocationDraft, Reading, ReadingDraft, Result, Store, SyncLogEntry, Upserted,
};
use uuid::Uuid;

use crate::client::PgStore;
use crate::rows::{AlertRow, AssetRow, LocationRow, ReadingRow};

fn db_err(e: sqlx::Error) -> Error {
    Error::persistence(e.to_string())
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_location(&self, draft: &LocationDraft) -> Result<Upserted> {
        let (id, created): (Uuid, bool) = sqlx::query_as(
            r#"
            INSERT INTO locations
                (id, external_id, name, address, customer_name, latitude, longitude, last_telemetry_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (external_id) DO UPDATE SET
                name = EXCLUDED.name,
                address = COALESCE(EXCLUDED.address, locations.address),
                customer_name = COALESCE(EXCLUDED.customer_name, locations.customer_name),
                latitude = COALESCE(EXCLUDED.latitude, locations.latitude),
                longitude = COALESCE(EXCLUDED.longitude, locations.longitude),
                last_telemetry_at = GREATEST(locations.last_telemetry_at, EXCLUDED.last_telemetry_at),
                updated_at = now()
            RETURNING id, (xmax = 0) AS created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.external_id)
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.customer_name)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.last_telemetry_at)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)?;

        Ok(Upserted { id, created })
    }

    async fn upsert_asset(&self, location_id: Uuid, draft: &AssetDraft) -> Result<Upserted> {
        let (id, created): (Uuid, bool) = sqlx::query_as(
            r#"
            INSERT INTO assets
                (id, external_id, location_id, online, capacity_liters, current_level_liters,
                 current_level_pct, device_serial, battery_volts, commodity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (external_id) DO UPDATE SET
                location_id = EXCLUDED.location_id,
                online = EXCLUDED.online,
                capacity_liters = EXCLUDED.capacity_liters,
                current_level_liters = EXCLUDED.current_level_liters,
                current_level_pct = EXCLUDED.current_level_pct,
                device_serial = COALESCE(EXCLUDED.device_serial, assets.device_serial),
                battery_volts = COALESCE(EXCLUDED.battery_volts, assets.battery_volts),
                commodity = COALESCE(EXCLUDED.commodity, assets.commodity),
                updated_at = now()
            RETURNING id, (xmax = 0) AS created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.external_id)
        .bind(location_id)
        .bind(draft.online)
        .bind(draft.capacity_liters)
        .bind(draft.current_level_liters)
        .bind(draft.current_level_pct)
        .bind(&draft.device_serial)
        .bind(draft.battery_volts)
        .bind(&draft.commodity)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)?;

        Ok(Upserted { id, created })
    }

    async fn append_reading(&self, asset_id: Uuid, draft: &ReadingDraft) -> Result<Appended> {
        let result = sqlx::query(
            r#"
            INSERT INTO readings
                (id, asset_id, recorded_at, level_liters, level_pct, battery_volts,
                 temperature_c, signal_strength)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (asset_id, recorded_at) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(asset_id)
        .bind(draft.recorded_at)
        .bind(draft.level_liters)
        .bind(draft.level_pct)
        .bind(draft.battery_volts)
        .bind(draft.temperature_c)
        .bind(draft.signal_strength)
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        Ok(Appended {
            inserted: result.rows_affected() == 1,
        })
    }

    async fn list_readings(
        &self,
        asset_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Reading>> {
        let rows: Vec<ReadingRow> = sqlx::query_as(
            r#"
            SELECT id, asset_id, recorded_at, level_liters, level_pct, battery_volts,
                   temperature_c, signal_strength
            FROM readings
            WHERE asset_id = $1 AND recorded_at >= $2 AND recorded_at < $3
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(asset_id)
        .bind(since)
        .bind(until)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Reading::from).collect())
    }

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>> {
        let row: Option<AssetRow> = sqlx::query_as("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;

        Ok(row.map(Asset::from))
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let rows: Vec<AssetRow> = sqlx::query_as("SELECT * FROM assets ORDER BY external_id")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Asset::from).collect())
    }

    async fn list_active_assets(&self) -> Result<Vec<Asset>> {
        let rows: Vec<AssetRow> = sqlx::query_as(
            r#"
            SELECT a.*
            FROM assets a
            JOIN locations l ON l.id = a.location_id
            WHERE NOT a.disabled AND NOT l.disabled
            ORDER BY a.external_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Asset::from).collect())
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        let rows: Vec<LocationRow> = sqlx::query_as("SELECT * FROM locations ORDER BY external_id")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn update_asset_consumption(
        &self,
        asset_id: Uuid,
        rolling_avg_liters_per_day: Option<f64>,
        days_remaining: Option<f64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE assets
            SET rolling_avg_liters_per_day = $2, days_remaining = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(asset_id)
        .bind(rolling_avg_liters_per_day)
        .bind(days_remaining)
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn replace_alert(
        &self,
        asset_id: Uuid,
        draft: Option<AlertDraft>,
    ) -> Result<AlertTransition> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        let transition = match draft {
            Some(alert) => {
                let cleared = sqlx::query("DELETE FROM alerts WHERE asset_id = $1 AND reason <> $2")
                    .bind(asset_id)
                    .bind(alert.reason.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?
                    .rows_affected();

                let inserted = sqlx::query(
                    r#"
                    INSERT INTO alerts (id, asset_id, severity, reason, raised_at)
                    VALUES ($1, $2, $3, $4, now())
                    ON CONFLICT (asset_id, reason) DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(asset_id)
                .bind(alert.severity.as_str())
                .bind(alert.reason.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?
                .rows_affected();

                AlertTransition {
                    raised: inserted == 1,
                    cleared: cleared as usize,
                }
            }
            None => {
                let cleared = sqlx::query("DELETE FROM alerts WHERE asset_id = $1")
                    .bind(asset_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?
                    .rows_affected();

                AlertTransition {
                    raised: false,
                    cleared: cleared as usize,
                }
            }
        };

        tx.commit().await.map_err(db_err)?;
        Ok(transition)
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>> {
        let rows: Vec<AlertRow> = sqlx::query_as(
            "SELECT id, asset_id, severity, reason, raised_at FROM alerts ORDER BY raised_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    async fn record_sync(&self, entry: &SyncLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_log
                (trigger_source, status, locations_processed, assets_processed,
                 readings_processed, alerts_triggered, records_failed, duration_ms,
                 error_summary, started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.trigger.as_str())
        .bind(entry.status.as_str())
        .bind(entry.counts.locations as i64)
        .bind(entry.counts.assets as i64)
        .bind(entry.counts.readings as i64)
        .bind(entry.alerts_triggered as i64)
        .bind(entry.records_failed as i64)
        .bind(entry.duration_ms as i64)
        .bind(&entry.error_summary)
        .bind(entry.started_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
