//! Test fixtures and vendor record generators.

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use tank_core::Store;

use crate::mocks::MemoryStore;

/// Shared secret the test server accepts on the webhook.
pub fn webhook_secret() -> String {
    "twk_test_hV4wW9yKpDq2".to_string()
}

/// Shared secret the test server accepts on the cron endpoint.
pub fn cron_secret() -> String {
    "twk_cron_Jm8sN3xTzR6f".to_string()
}

/// A well-formed vendor record in canonical field names.
pub fn vendor_record(tank_id: &str, site_id: &str, level: f64, capacity: f64) -> Value {
    json!({
        "assetId": tank_id,
        "locationId": site_id,
        "locationName": format!("Site {site_id}"),
        "capacityLiters": capacity,
        "levelLiters": level,
        "levelPercent": (level / capacity * 100.0),
        "batteryVolts": 3.6,
        "timestamp": Utc::now().to_rfc3339()
    })
}

/// A record using drifted vendor aliases instead of canonical names.
pub fn aliased_record(tank_id: &str, site_id: &str, level: f64, capacity: f64) -> Value {
    json!({
        "TankID": tank_id,
        "siteId": site_id,
        "siteName": format!("Site {site_id}"),
        "capacityLitres": capacity.to_string(),
        "volume": level.to_string(),
        "batteryVoltage": "3.4",
        "readingTime": Utc::now().timestamp()
    })
}

/// A record missing the required asset identifier.
pub fn record_missing_asset_id(site_id: &str) -> Value {
    json!({
        "locationId": site_id,
        "capacityLiters": 1000.0,
        "levelLiters": 400.0
    })
}

/// N well-formed records across distinct tanks at one site.
pub fn vendor_records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| vendor_record(&format!("tank-{i}"), "site-1", 400.0 + i as f64, 1000.0))
        .collect()
}

pub fn array_payload(records: Vec<Value>) -> String {
    serde_json::to_string(&records).unwrap()
}

pub fn wrapper_payload(records: Vec<Value>) -> String {
    json!({ "tanks": records, "vendor": "acme-telemetry" }).to_string()
}

/// Seed one asset with a daily reading series, oldest first; the newest
/// reading lands at `now`. Returns the asset's external id.
pub async fn seed_series(
    store: &Arc<MemoryStore>,
    tank_id: &str,
    site_id: &str,
    levels: &[f64],
) -> uuid::Uuid {
    let store: Arc<dyn Store> = store.clone();
    let now = Utc::now();
    let capacity = 1000.0;

    let mut asset_id = None;
    for (i, &level) in levels.iter().enumerate() {
        let age_days = (levels.len() - 1 - i) as i64;
        let recorded_at = now - Duration::days(age_days);

        let record = json!({
            "assetId": tank_id,
            "locationId": site_id,
            "capacityLiters": capacity,
            "levelLiters": level,
            "levelPercent": (level / capacity * 100.0),
            "timestamp": recorded_at.to_rfc3339()
        });
        let normalized = tank_core::normalize(&record).unwrap();

        let location = store.upsert_location(&normalized.location).await.unwrap();
        let asset = store
            .upsert_asset(location.id, &normalized.asset)
            .await
            .unwrap();
        store
            .append_reading(asset.id, &normalized.reading)
            .await
            .unwrap();
        asset_id = Some(asset.id);
    }

    asset_id.expect("seed_series needs at least one level")
}
