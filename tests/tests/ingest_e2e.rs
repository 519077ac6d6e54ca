//! End-to-end tests for the webhook ingestion pipeline.
//!
//! These drive the full flow through the real axum router and
//! orchestrator: POST /webhook/telemetry → normalize → MemoryStore →
//! analytics → alerts. The MemoryStore implements the same `Store` trait
//! as the Postgres implementation, so everything except the SQL transport
//! is production code.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn auth_header() -> String {
    format!("Bearer {}", fixtures::webhook_secret())
}

#[tokio::test]
async fn ingest_array_of_valid_records() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = fixtures::array_payload(fixtures::vendor_records(5));

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(payload.into())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["assetsProcessed"], 5);
    assert_eq!(body["stats"]["readingsProcessed"], 5);

    assert_eq!(ctx.store.reading_count(), 5);
    assert!(ctx.store.asset_by_external_id("tank-0").is_some());
}

#[tokio::test]
async fn ingest_single_record_object() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let record = fixtures::vendor_record("tank-solo", "site-9", 250.0, 500.0);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(record.to_string().into())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["assetsProcessed"], 1);

    let asset = ctx.store.asset_by_external_id("tank-solo").unwrap();
    assert_eq!(asset.current_level_liters, 250.0);
    assert_eq!(asset.current_level_pct, 50.0);
}

#[tokio::test]
async fn ingest_wrapper_object_with_aliased_fields() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let records = vec![
        fixtures::aliased_record("t-alias-1", "s-2", 812.5, 2000.0),
        fixtures::aliased_record("t-alias-2", "s-2", 90.0, 2000.0),
    ];

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(fixtures::wrapper_payload(records).into())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["assetsProcessed"], 2);

    // Alias-named fields landed in canonical columns.
    let asset = ctx.store.asset_by_external_id("t-alias-1").unwrap();
    assert_eq!(asset.capacity_liters, 2000.0);
    assert_eq!(asset.current_level_liters, 812.5);
    // Both records share the site; the location upserted once.
    assert!(ctx.store.location_by_external_id("s-2").is_some());
}

#[tokio::test]
async fn mixed_batch_reports_partial_with_tagged_errors() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // Record at index 1 omits the required asset identifier.
    let payload = fixtures::array_payload(vec![
        fixtures::vendor_record("tank-a", "site-1", 400.0, 1000.0),
        fixtures::record_missing_asset_id("site-1"),
        fixtures::vendor_record("tank-b", "site-1", 600.0, 1000.0),
    ]);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(payload.into())
        .await;

    response.assert_status(StatusCode::MULTI_STATUS);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["assetsProcessed"], 2);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["record"], 1);
    assert!(errors[0]["message"].as_str().unwrap().contains("assetId"));

    // The invalid record never reached the store.
    assert_eq!(ctx.store.reading_count(), 2);
}

#[tokio::test]
async fn all_invalid_batch_reports_error() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = fixtures::array_payload(vec![
        fixtures::record_missing_asset_id("site-1"),
        fixtures::record_missing_asset_id("site-2"),
    ]);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(payload.into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    assert_eq!(ctx.store.reading_count(), 0);
}

#[tokio::test]
async fn duplicate_reading_is_ignored_not_overwritten() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut record = fixtures::vendor_record("tank-dup", "site-1", 500.0, 1000.0);
    record["timestamp"] = serde_json::json!("2025-03-01T12:00:00Z");

    let first = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(record.to_string().into())
        .await;
    first.assert_status_ok();

    let second = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(record.to_string().into())
        .await;
    second.assert_status_ok();

    let body: serde_json::Value = second.json();
    assert_eq!(body["stats"]["readingsProcessed"], 0);
    assert!(body["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["message"].as_str().unwrap().contains("duplicate")));

    assert_eq!(ctx.store.reading_count(), 1);
}

#[tokio::test]
async fn critically_low_tank_raises_one_alert() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // 8% is below both the low (30%) and critical (15%) thresholds.
    let record = fixtures::vendor_record("tank-low", "site-1", 80.0, 1000.0);

    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(record.to_string().into())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["alertsTriggered"], 1);

    let alerts = ctx.store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].reason.as_str(), "critical_fuel");
}

#[tokio::test]
async fn every_run_appends_a_sync_log_entry() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = fixtures::array_payload(fixtures::vendor_records(2));
    server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(payload.into())
        .await
        .assert_status_ok();

    let entries = ctx.store.sync_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].counts.readings, 2);
    assert_eq!(entries[0].trigger.as_str(), "webhook");
}

#[tokio::test]
async fn sync_log_failure_never_changes_the_outcome() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.store.set_fail_sync_log(true);

    let payload = fixtures::array_payload(fixtures::vendor_records(3));
    let response = server
        .post("/webhook/telemetry")
        .content_type("application/json")
        .add_header("Authorization", auth_header())
        .bytes(payload.into())
        .await;

    // The run still reports success; the audit row is best-effort.
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["readingsProcessed"], 3);
    assert!(ctx.store.sync_entries().is_empty());
}
