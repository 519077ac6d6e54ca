//! Health and read-only collaborator endpoint tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn auth_header() -> String {
    format!("Bearer {}", fixtures::webhook_secret())
}

#[tokio::test]
async fn liveness_is_always_ok() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn health_reports_components_and_metrics() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    telemetry::health().postgres.set_healthy();
    telemetry::health().provider.set_healthy();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["metrics"]["records_received"].is_number());
}

#[tokio::test]
async fn readiness_tracks_the_store() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    telemetry::health().postgres.set_healthy();
    server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn collaborators_read_assets_with_cached_consumption() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    fixtures::seed_series(&ctx.store, "tank-1", "site-1", &[700.0, 600.0, 500.0]).await;
    ctx.orchestrator.engine().recalculate_all().await.unwrap();

    let response = server
        .get("/assets")
        .add_header("Authorization", auth_header())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let assets = body.as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["external_id"], "tank-1");
    assert_eq!(assets[0]["rolling_avg_liters_per_day"], 100.0);
}

#[tokio::test]
async fn asset_readings_window_defaults_to_the_analytics_window() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let asset_id =
        fixtures::seed_series(&ctx.store, "tank-1", "site-1", &[500.0, 450.0, 400.0]).await;

    let response = server
        .get(&format!("/assets/{asset_id}/readings"))
        .add_header("Authorization", auth_header())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 3);
    // Ascending by timestamp.
    assert!(readings[0]["recorded_at"].as_str() < readings[2]["recorded_at"].as_str());
}

#[tokio::test]
async fn unknown_asset_is_a_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get(&format!("/assets/{}", uuid::Uuid::new_v4()))
        .add_header("Authorization", auth_header())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_surface_requires_the_shared_secret() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server
        .get("/locations")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
