//! Alert threshold configuration.

use serde::{Deserialize, Serialize};

/// Thresholds the alert generator evaluates every asset against.
///
/// Passed explicitly into the generator at construction; there is no ambient
/// global threshold state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Level percent at or below which a `low_fuel` warning fires.
    #[serde(default = "default_low_fuel_pct")]
    pub low_fuel_pct: f64,
    /// Level percent at or below which a `critical_fuel` alert fires.
    #[serde(default = "default_critical_pct")]
    pub critical_pct: f64,
    /// Days-remaining at or below which a `days_remaining` alert fires.
    #[serde(default = "default_days_remaining_critical")]
    pub days_remaining_critical: f64,
}

fn default_low_fuel_pct() -> f64 {
    30.0
}

fn default_critical_pct() -> f64 {
    15.0
}

fn default_days_remaining_critical() -> f64 {
    7.0
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_fuel_pct: default_low_fuel_pct(),
            critical_pct: default_critical_pct(),
            days_remaining_critical: default_days_remaining_critical(),
        }
    }
}
