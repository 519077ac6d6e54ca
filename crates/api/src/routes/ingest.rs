//! Webhook ingestion endpoint.
//!
//! Accepts a single vendor record, an array of records, or a wrapper
//! object. Authentication, method filtering, and body-shape rejection all
//! happen here; the orchestrator only ever sees a parsed payload.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use tank_core::limits::{MAX_BATCH_RECORDS, MAX_PAYLOAD_BYTES};
use tank_core::{SyncTrigger, VendorPayload};

use crate::extractors::AuthContext;
use crate::response::{ApiError, IngestResponse};
use crate::state::AppState;

/// POST /webhook/telemetry - vendor push ingestion.
pub async fn ingest_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
    body: Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body is required"));
    }

    if body.len() > MAX_PAYLOAD_BYTES {
        return Err(ApiError::bad_request(format!(
            "payload size {}KB exceeds {}KB limit",
            body.len() / 1024,
            MAX_PAYLOAD_BYTES / 1024
        )));
    }

    let payload = match VendorPayload::parse(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "Failed to parse vendor payload");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(IngestResponse::rejected(e.to_string())),
            ));
        }
    };

    if payload.len() > MAX_BATCH_RECORDS {
        return Err(ApiError::bad_request(format!(
            "batch has {} records, exceeds {} limit",
            payload.len(),
            MAX_BATCH_RECORDS
        )));
    }

    debug!(records = payload.len(), "Received vendor batch");

    let result = state.orchestrator.run(payload, SyncTrigger::Webhook).await;
    let (status, body) = IngestResponse::from_result(result);

    Ok((status, Json(body)))
}
