//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::warn;

use crate::response::ApiError;
use crate::state::AppState;

/// Header a trusted platform scheduler stamps onto cron-triggered requests.
const SCHEDULED_TASK_HEADER: &str = "x-scheduled-task";

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Authenticated webhook context.
///
/// The vendor authenticates with a shared-secret bearer token compared by
/// exact string match.
#[derive(Debug, Clone)]
pub struct AuthContext;

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) if token == state.auth.webhook_secret => Ok(AuthContext),
            Some(_) => {
                warn!("Webhook request with invalid bearer token");
                Err(ApiError::unauthorized("invalid bearer token"))
            }
            None => {
                warn!("Webhook request missing bearer token");
                Err(ApiError::unauthorized("bearer token is required"))
            }
        }
    }
}

/// Authorization for the scheduled recalculation endpoint.
///
/// Accepts either the platform scheduler's trust header or a bearer token;
/// both compare against the configured cron secret.
#[derive(Debug, Clone)]
pub struct CronAuth;

#[async_trait]
impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.auth.cron_token();

        let scheduled = parts
            .headers
            .get(SCHEDULED_TASK_HEADER)
            .and_then(|h| h.to_str().ok());
        if scheduled == Some(expected) {
            return Ok(CronAuth);
        }

        if bearer_token(parts) == Some(expected) {
            return Ok(CronAuth);
        }

        warn!("Recalculation request without valid authorization");
        Err(ApiError::unauthorized(
            "scheduler trust header or bearer token is required",
        ))
    }
}
