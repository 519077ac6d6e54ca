//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use tank_core::limits::MAX_REPORTED_ISSUES;
use tank_core::{SyncIssue, SyncResult, SyncStatus};

/// Per-entity stats reported back to the webhook caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub locations_processed: usize,
    pub assets_processed: usize,
    pub readings_processed: usize,
    pub alerts_triggered: usize,
    /// Run duration in milliseconds.
    pub duration: u64,
}

/// Webhook response body.
///
/// Warnings and errors are capped to the first few entries to bound payload
/// size; the counts still reflect everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub stats: IngestStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<SyncIssue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<SyncIssue>>,
}

fn cap(issues: Vec<SyncIssue>) -> Option<Vec<SyncIssue>> {
    if issues.is_empty() {
        None
    } else {
        Some(issues.into_iter().take(MAX_REPORTED_ISSUES).collect())
    }
}

impl IngestResponse {
    /// Map a sync result onto the response body and its HTTP status:
    /// 200 for `success`, 207 for `partial`, 400 for `error`.
    pub fn from_result(result: SyncResult) -> (StatusCode, Self) {
        let status = match result.status {
            SyncStatus::Success => StatusCode::OK,
            SyncStatus::Partial => StatusCode::MULTI_STATUS,
            SyncStatus::Error => StatusCode::BAD_REQUEST,
        };

        let message = format!(
            "processed {} records: {} ok, {} failed",
            result.records_ok + result.records_failed,
            result.records_ok,
            result.records_failed
        );

        let body = Self {
            success: result.status != SyncStatus::Error,
            message,
            stats: IngestStats {
                locations_processed: result.counts.locations,
                assets_processed: result.counts.assets,
                readings_processed: result.counts.readings,
                alerts_triggered: result.alerts_triggered,
                duration: result.duration_ms,
            },
            errors: cap(result.errors),
            warnings: cap(result.warnings),
        };

        (status, body)
    }

    /// A request rejected before the orchestrator ran (bad payload shape).
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            stats: IngestStats::default(),
            errors: None,
            warnings: None,
        }
    }
}

/// Scheduled recalculation response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalcResponse {
    pub success: bool,
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
    /// Run duration in milliseconds.
    pub duration: u64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub postgres_connected: bool,
    pub provider_connected: bool,
    pub metrics: telemetry::MetricsSnapshot,
}

/// Error response for requests rejected at the boundary.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Boundary error with its HTTP status.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<tank_core::Error> for ApiError {
    fn from(err: tank_core::Error) -> Self {
        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}
