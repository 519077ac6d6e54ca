//! Scheduled recalculation endpoint tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

#[tokio::test]
async fn scheduler_trust_header_is_accepted() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    fixtures::seed_series(&ctx.store, "tank-1", "site-1", &[700.0, 600.0, 500.0]).await;

    let response = server
        .post("/cron/recalculate")
        .add_header("x-scheduled-task", fixtures::cron_secret())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["processed"], 1);
    assert_eq!(body["updated"], 1);

    let asset = ctx.store.asset_by_external_id("tank-1").unwrap();
    assert_eq!(asset.rolling_avg_liters_per_day, Some(100.0));
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/cron/recalculate")
        .add_header(
            "Authorization",
            format!("Bearer {}", fixtures::cron_secret()),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn unauthorized_trigger_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/cron/recalculate").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let wrong = server
        .post("/cron/recalculate")
        .add_header("x-scheduled-task", "guessed-secret")
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recalculation_appends_a_sync_log_row() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    fixtures::seed_series(&ctx.store, "tank-1", "site-1", &[500.0, 400.0]).await;

    server
        .post("/cron/recalculate")
        .add_header("x-scheduled-task", fixtures::cron_secret())
        .await
        .assert_status_ok();

    let entries = ctx.store.sync_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].trigger.as_str(), "scheduled");
    assert_eq!(entries[0].counts.assets, 1);
}
