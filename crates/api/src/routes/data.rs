//! Read-only collaborator endpoints.
//!
//! Dashboards and report generators consume the pipeline's output through
//! this surface: persisted locations, assets (including the cached
//! consumption fields), readings, and active alerts. Strictly read-only;
//! mutation happens only through ingestion.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use tank_core::limits::ANALYTICS_WINDOW_DAYS;
use tank_core::{Alert, Asset, Location, Reading};

use crate::extractors::AuthContext;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /locations
pub async fn list_locations(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.store.list_locations().await?))
}

/// GET /assets
pub async fn list_assets(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<Asset>>, ApiError> {
    Ok(Json(state.store.list_assets().await?))
}

/// GET /assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    state
        .store
        .get_asset(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no asset {id}")))
}

#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// GET /assets/{id}/readings?since&until
///
/// Defaults to the trailing analytics window when no bounds are given.
pub async fn list_readings(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let until = query.until.unwrap_or_else(Utc::now);
    let since = query
        .since
        .unwrap_or_else(|| until - Duration::days(ANALYTICS_WINDOW_DAYS));

    if since >= until {
        return Err(ApiError::bad_request("'since' must precede 'until'"));
    }

    Ok(Json(state.store.list_readings(id, since, until).await?))
}

/// GET /alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(state.store.list_alerts().await?))
}
