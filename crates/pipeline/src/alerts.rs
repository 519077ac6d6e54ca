//! Alert generation.
//!
//! Pure threshold evaluation with a fixed precedence: critical fuel percent
//! beats low fuel percent beats the days-remaining projection. At most one
//! alert stays active per asset; the store's `replace_alert` supersedes
//! lower-severity rows and makes re-evaluation with unchanged inputs a
//! no-op.

use std::sync::Arc;

use telemetry::metrics;
use tracing::info;

use tank_core::{
    AlertDraft, AlertReason, AlertSeverity, AlertThresholds, AlertTransition, Asset, Result, Store,
};

/// Threshold evaluator for one configured set of thresholds.
#[derive(Debug, Clone, Copy)]
pub struct AlertGenerator {
    thresholds: AlertThresholds,
}

impl AlertGenerator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Decide the single alert (if any) that should be active for the given
    /// asset state. Pure function of its inputs.
    pub fn evaluate(&self, level_pct: f64, days_remaining: Option<f64>) -> Option<AlertDraft> {
        if level_pct <= self.thresholds.critical_pct {
            return Some(AlertDraft {
                severity: AlertSeverity::Critical,
                reason: AlertReason::CriticalFuel,
            });
        }
        if level_pct <= self.thresholds.low_fuel_pct {
            return Some(AlertDraft {
                severity: AlertSeverity::Warning,
                reason: AlertReason::LowFuel,
            });
        }
        if let Some(days) = days_remaining {
            if days <= self.thresholds.days_remaining_critical {
                return Some(AlertDraft {
                    severity: AlertSeverity::Critical,
                    reason: AlertReason::DaysRemaining,
                });
            }
        }
        None
    }

    /// Evaluate an asset and make the store reflect the decision.
    pub async fn apply(&self, store: &Arc<dyn Store>, asset: &Asset) -> Result<AlertTransition> {
        let draft = self.evaluate(asset.current_level_pct, asset.days_remaining);
        let transition = store.replace_alert(asset.id, draft).await?;

        if let (true, Some(draft)) = (transition.raised, draft) {
            metrics().alerts_raised.inc();
            info!(
                asset = %asset.external_id,
                reason = draft.reason.as_str(),
                severity = draft.severity.as_str(),
                level_pct = asset.current_level_pct,
                "Alert raised"
            );
        }
        if transition.cleared > 0 {
            metrics().alerts_cleared.inc_by(transition.cleared as u64);
        }

        Ok(transition)
    }
}
