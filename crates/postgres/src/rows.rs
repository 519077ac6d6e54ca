//! Row types mapping Postgres results onto the core model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tank_core::{Alert, AlertReason, AlertSeverity, Asset, Error, Location, Reading, Result};
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub customer_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_telemetry_at: Option<DateTime<Utc>>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            address: row.address,
            customer_name: row.customer_name,
            latitude: row.latitude,
            longitude: row.longitude,
            last_telemetry_at: row.last_telemetry_at,
            disabled: row.disabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AssetRow {
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

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Asset {
            id: row.id,
            external_id: row.external_id,
            location_id: row.location_id,
            online: row.online,
            capacity_liters: row.capacity_liters,
            current_level_liters: row.current_level_liters,
            current_level_pct: row.current_level_pct,
            rolling_avg_liters_per_day: row.rolling_avg_liters_per_day,
            days_remaining: row.days_remaining,
            device_serial: row.device_serial,
            battery_volts: row.battery_volts,
            commodity: row.commodity,
            disabled: row.disabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ReadingRow {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub level_liters: f64,
    pub level_pct: f64,
    pub battery_volts: Option<f64>,
    pub temperature_c: Option<f64>,
    pub signal_strength: Option<f64>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            id: row.id,
            asset_id: row.asset_id,
            recorded_at: row.recorded_at,
            level_liters: row.level_liters,
            level_pct: row.level_pct,
            battery_volts: row.battery_volts,
            temperature_c: row.temperature_c,
            signal_strength: row.signal_strength,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub severity: String,
    pub reason: String,
    pub raised_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = Error;

    fn try_from(row: AlertRow) -> Result<Self> {
        Ok(Alert {
            id: row.id,
            asset_id: row.asset_id,
            severity: parse_severity(&row.severity)?,
            reason: parse_reason(&row.reason)?,
            raised_at: row.raised_at,
        })
    }
}

fn parse_severity(raw: &str) -> Result<AlertSeverity> {
    match raw {
        "warning" => Ok(AlertSeverity::Warning),
        "critical" => Ok(AlertSeverity::Critical),
        other => Err(Error::persistence(format!("unknown alert severity '{other}'"))),
    }
}

fn parse_reason(raw: &str) -> Result<AlertReason> {
    match raw {
        "low_fuel" => Ok(AlertReason::LowFuel),
        "critical_fuel" => Ok(AlertReason::CriticalFuel),
        "days_remaining" => Ok(AlertReason::DaysRemaining),
        other => Err(Error::persistence(format!("unknown alert reason '{other}'"))),
    }
}
