//! Telemetry normalizer.
//!
//! Maps one raw vendor record into a canonical Location/Asset/Reading triple
//! or fails with a validation error naming the offending field. Pure: no
//! side effects, which is what lets the orchestrator isolate faults per
//! record.
//!
//! Coercion policy:
//! - every logical field has an alias table (vendors rename fields across
//!   firmware versions); the canonical name is first, so re-normalizing an
//!   already-canonical record is a no-op;
//! - missing numeric fields coerce to 0.0 with a warning, never an error;
//! - missing identifiers reject this record, not the batch;
//! - out-of-range percentages are clamped to [0, 100] with a warning;
//! - a level above capacity is clamped to capacity with a warning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{Error, Result};
use crate::raw::RawRecord;

// Alias tables. Canonical name first; the rest are vendor spellings
// observed across firmware versions.
const ASSET_ID: &[&str] = &["assetId", "tankId", "TankID", "tank_id", "deviceId"];
const LOCATION_ID: &[&str] = &["locationId", "siteId", "site_id", "SiteID"];
const LOCATION_NAME: &[&str] = &["locationName", "siteName", "site_name", "name"];
const ADDRESS: &[&str] = &["address", "addr", "siteAddress"];
const CUSTOMER_NAME: &[&str] = &["customerName", "customer", "accountName"];
const LATITUDE: &[&str] = &["latitude", "lat"];
const LONGITUDE: &[&str] = &["longitude", "lng", "lon"];
const ONLINE: &[&str] = &["online", "isOnline", "active", "connected"];
const CAPACITY: &[&str] = &["capacityLiters", "capacity", "capacityLitres", "tankSize"];
const LEVEL: &[&str] = &["levelLiters", "level", "levelLitres", "volume", "currentLevel"];
const LEVEL_PCT: &[&str] = &["levelPercent", "percent", "levelPct", "fillPercent"];
const BATTERY: &[&str] = &["batteryVolts", "battery", "batteryVoltage", "volts"];
const TEMPERATURE: &[&str] = &["temperatureC", "temperature", "temp"];
const SIGNAL: &[&str] = &["signalStrength", "signal", "rssi"];
const SERIAL: &[&str] = &["deviceSerial", "serialNumber", "serial", "sn"];
const COMMODITY: &[&str] = &["commodity", "product", "fuelType"];
const RECORDED_AT: &[&str] = &["timestamp", "readingTime", "recordedAt", "time", "ts"];

/// Canonical site fields extracted from one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationDraft {
    #[validate(length(min = 1, max = 200))]
    pub external_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub last_telemetry_at: DateTime<Utc>,
}

/// Canonical tank fields extracted from one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AssetDraft {
    #[validate(length(min = 1, max = 200))]
    pub external_id: String,
    #[validate(length(min = 1, max = 200))]
    pub location_external_id: String,
    pub online: bool,
    #[validate(range(min = 0.0))]
    pub capacity_liters: f64,
    #[validate(range(min = 0.0))]
    pub current_level_liters: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub current_level_pct: f64,
    #[validate(length(max = 64))]
    pub device_serial: Option<String>,
    pub battery_volts: Option<f64>,
    #[validate(length(max = 64))]
    pub commodity: Option<String>,
}

/// Canonical observation extracted from one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReadingDraft {
    pub recorded_at: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub level_liters: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub level_pct: f64,
    pub battery_volts: Option<f64>,
    pub temperature_c: Option<f64>,
    pub signal_strength: Option<f64>,
}

/// The canonical triple produced from one vendor record, plus the warnings
/// accumulated while coercing it.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub location: LocationDraft,
    pub asset: AssetDraft,
    pub reading: ReadingDraft,
    pub warnings: Vec<String>,
}

/// Normalize one raw vendor record.
pub fn normalize(value: &Value) -> Result<NormalizedRecord> {
    let raw = RawRecord::from_value(value)?;
    let mut warnings = Vec::new();

    // Identifiers are the only hard requirement; everything else coerces.
    let asset_external_id = raw
        .str_field(ASSET_ID)
        .ok_or_else(|| Error::missing_field("assetId"))?;
    let location_external_id = raw
        .str_field(LOCATION_ID)
        .ok_or_else(|| Error::missing_field("locationId"))?;

    let capacity_liters = numeric_or_zero(&raw, CAPACITY, "capacityLiters", &mut warnings);
    let mut level_liters = numeric_or_zero(&raw, LEVEL, "levelLiters", &mut warnings);

    if capacity_liters > 0.0 && level_liters > capacity_liters {
        warnings.push(format!(
            "levelLiters {level_liters} exceeds capacity {capacity_liters}, clamped"
        ));
        level_liters = capacity_liters;
    }

    let level_pct = match raw.f64_field(LEVEL_PCT) {
        Some(pct) if !(0.0..=100.0).contains(&pct) => {
            let clamped = pct.clamp(0.0, 100.0);
            warnings.push(format!("levelPercent {pct} out of range, clamped to {clamped}"));
            clamped
        }
        Some(pct) => pct,
        None if capacity_liters > 0.0 => (level_liters / capacity_liters * 100.0).clamp(0.0, 100.0),
        None => {
            warnings.push("levelPercent missing and capacity unknown, defaulting to 0".into());
            0.0
        }
    };

    let recorded_at = match raw.timestamp_field(RECORDED_AT) {
        Some(ts) => ts,
        None => {
            let now = Utc::now();
            warnings.push("timestamp missing or unparseable, using receive time".into());
            now
        }
    };

    let location = LocationDraft {
        external_id: location_external_id.clone(),
        name: raw
            .str_field(LOCATION_NAME)
            .unwrap_or_else(|| location_external_id.clone()),
        address: raw.str_field(ADDRESS),
        customer_name: raw.str_field(CUSTOMER_NAME),
        latitude: raw.f64_field(LATITUDE),
        longitude: raw.f64_field(LONGITUDE),
        last_telemetry_at: recorded_at,
    };

    let asset = AssetDraft {
        external_id: asset_external_id,
        location_external_id,
        online: raw.bool_field(ONLINE).unwrap_or(true),
        capacity_liters,
        current_level_liters: level_liters,
        current_level_pct: level_pct,
        device_serial: raw.str_field(SERIAL),
        battery_volts: raw.f64_field(BATTERY),
        commodity: raw.str_field(COMMODITY),
    };

    let reading = ReadingDraft {
        recorded_at,
        level_liters,
        level_pct,
        battery_volts: raw.f64_field(BATTERY),
        temperature_c: raw.f64_field(TEMPERATURE),
        signal_strength: raw.f64_field(SIGNAL),
    };

    location
        .validate()
        .map_err(|e| Error::validation("location", e.to_string()))?;
    asset
        .validate()
        .map_err(|e| Error::validation("asset", e.to_string()))?;
    reading
        .validate()
        .map_err(|e| Error::validation("reading", e.to_string()))?;

    Ok(NormalizedRecord {
        location,
        asset,
        reading,
        warnings,
    })
}

fn numeric_or_zero(
    raw: &RawRecord,
    aliases: &[&str],
    canonical: &str,
    warnings: &mut Vec<String>,
) -> f64 {
    match raw.f64_field(aliases) {
        Some(v) => v,
        None => {
            warnings.push(format!("{canonical} missing, defaulting to 0"));
            0.0
        }
    }
}
