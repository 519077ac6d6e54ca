//! Boundary rejection and failure-isolation tests for the webhook.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn auth_header() -> String {
    format!("Bearer {}", fixtures::webhook_secret())
}

#[tokio::test]
async fn missing_bearer_token_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .bytes(fixtures::array_payload(fixtures::vendor_records(1)).into())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.store.reading_count(), 0);
}

#[tokio::test]
async fn wrong_bearer_token_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", "Bearer not-the-secret")
        .bytes(fixtures::array_payload(fixtures::vendor_records(1)).into())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_body_is_rejected_before_the_orchestrator() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.sync_entries().is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/webhook/telemetry").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn store_outage_fails_records_not_the_process() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.store.set_fail_all(true);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::array_payload(fixtures::vendor_records(2)).into())
        .await;

    // Every record failed to persist: the run is an error, reported as a
    // structured result rather than a raw 500.
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reading_failures_leave_sibling_records_intact() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // First batch persists one tank cleanly.
    server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::vendor_record("tank-ok", "site-1", 700.0, 1000.0).to_string().into())
        .await
        .assert_status_ok();

    // Reading inserts start failing; location/asset upserts still work.
    ctx.store.set_fail_readings(true);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::vendor_record("tank-bad", "site-1", 300.0, 1000.0).to_string().into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    // The asset row still upserted before the reading failed.
    assert!(ctx.store.asset_by_external_id("tank-bad").is_some());
    // The earlier tank's reading is untouched.
    assert_eq!(ctx.store.reading_count(), 1);
}

#[tokio::test]
async fn reported_errors_are_capped_to_five() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let records: Vec<serde_json::Value> = (0..12)
        .map(|i| fixtures::record_missing_asset_id(&format!("site-{i}")))
        .collect();

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::array_payload(records).into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"].as_array().unwrap().len(), 5);
    // The sync log still records the full failure count.
    assert_eq!(ctx.store.sync_entries()[0].records_failed, 12);
}

#[tokio::test]
async fn oversized_batch_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::array_payload(fixtures::vendor_records(501)).into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.reading_count(), 0);
}
