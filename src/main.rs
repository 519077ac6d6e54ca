//! Tankwatch Telemetry Pipeline
//!
//! Tank-monitoring ingestion service handling:
//! - vendor webhook batches with per-record fault isolation
//! - normalized Location/Asset/Reading persistence in Postgres
//! - rolling burn-rate and days-remaining analytics
//! - threshold alerting and sync audit logging

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState, AuthConfig};
use pipeline::{AnalyticsConfig, IngestOrchestrator};
use postgres_store::{PgStore, StoreConfig};
use provider::{ProviderClient, ProviderConfig};
use tank_core::{AlertThresholds, Error, Store};
use telemetry::{health, init_tracing_from_env};
use worker::{WorkerConfig, WorkerScheduler};

/// Background worker intervals, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkerSettings {
    #[serde(default = "default_poll_interval_secs")]
    poll_interval_secs: u64,
    #[serde(default = "default_recalc_interval_secs")]
    recalc_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    900
}

fn default_recalc_interval_secs() -> u64 {
    3600
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            recalc_interval_secs: default_recalc_interval_secs(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Shared secret the vendor presents on the webhook. Required.
    #[serde(default)]
    webhook_secret: String,
    /// Separate secret for the scheduled recalculation endpoint.
    #[serde(default)]
    cron_secret: Option<String>,

    #[serde(default)]
    database: StoreConfig,

    #[serde(default)]
    provider: ProviderConfig,

    #[serde(default)]
    analytics: AnalyticsConfig,

    #[serde(default)]
    thresholds: AlertThresholds,

    #[serde(default)]
    workers: WorkerSettings,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_secret: String::new(),
            cron_secret: None,
            database: StoreConfig::default(),
            provider: ProviderConfig::default(),
            analytics: AnalyticsConfig::default(),
            thresholds: AlertThresholds::default(),
            workers: WorkerSettings::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting Tankwatch pipeline v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    // A missing webhook secret is the one startup condition that must abort
    // before any record is processed.
    if config.webhook_secret.is_empty() {
        return Err(Error::configuration("TANKWATCH_WEBHOOK_SECRET is required").into());
    }

    // Connect to Postgres and run migrations
    let pg = PgStore::connect(config.database.clone())
        .await
        .context("Failed to connect to Postgres")?;
    let store: Arc<dyn Store> = Arc::new(pg.clone());

    check_health(&pg, &config).await;

    // Build the pipeline
    let orchestrator = Arc::new(IngestOrchestrator::new(
        store.clone(),
        config.analytics,
        config.thresholds,
    ));

    // Start background workers
    let worker_config = WorkerConfig {
        poll_interval: Duration::from_secs(config.workers.poll_interval_secs),
        recalc_interval: Duration::from_secs(config.workers.recalc_interval_secs),
    };
    let scheduler = if config.provider.is_configured() {
        let client =
            ProviderClient::new(&config.provider).context("Failed to build provider client")?;
        Arc::new(WorkerScheduler::with_provider(
            worker_config,
            store.clone(),
            orchestrator.clone(),
            client,
        ))
    } else {
        info!("No vendor API configured; scheduled pull disabled");
        Arc::new(WorkerScheduler::new(
            worker_config,
            store.clone(),
            orchestrator.clone(),
        ))
    };
    let _worker_handles = scheduler.start();

    // Create application state
    let state = AppState::new(
        store,
        orchestrator,
        AuthConfig {
            webhook_secret: config.webhook_secret.clone(),
            cron_secret: config.cron_secret.clone(),
        },
    );

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("TANKWATCH")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested sections; the config crate's nested
    // parsing doesn't work reliably with underscored field names.
    if let Ok(url) = std::env::var("TANKWATCH_DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(secret) = std::env::var("TANKWATCH_WEBHOOK_SECRET") {
        config.webhook_secret = secret;
    }
    if let Ok(secret) = std::env::var("TANKWATCH_CRON_SECRET") {
        config.cron_secret = Some(secret);
    }
    if let Ok(base_url) = std::env::var("TANKWATCH_PROVIDER_BASE_URL") {
        config.provider.base_url = base_url;
    }
    if let Ok(token) = std::env::var("TANKWATCH_PROVIDER_API_TOKEN") {
        config.provider.api_token = Some(token);
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(pg: &PgStore, config: &Config) {
    if postgres_store::health::check_connection(pg).await {
        health().postgres.set_healthy();
        info!("Postgres connection: healthy");
    } else {
        health().postgres.set_unhealthy("Connection failed");
        error!("Postgres connection: unhealthy");
    }

    // The provider is only exercised by the scheduled pull; mark it healthy
    // until a poll says otherwise.
    health().provider.set_healthy();
    if !config.provider.is_configured() {
        info!("Vendor API not configured");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
