//! API routes.

pub mod data;
pub mod health;
pub mod ingest;
pub mod recalculate;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/webhook/telemetry", post(ingest::ingest_handler))
        .route("/cron/recalculate", post(recalculate::recalculate_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/locations", get(data::list_locations))
        .route("/assets", get(data::list_assets))
        .route("/assets/:id", get(data::get_asset))
        .route("/assets/:id/readings", get(data::list_readings))
        .route("/alerts", get(data::list_alerts))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
