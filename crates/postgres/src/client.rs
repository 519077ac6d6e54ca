//! Postgres client wrapper.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tank_core::{Error, Result};
use tracing::info;

use crate::config::StoreConfig;

/// Postgres-backed store with a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    config: StoreConfig,
}

impl PgStore {
    /// Connect, apply timeouts, and run pending migrations.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| Error::configuration(format!("invalid database url: {e}")))?
            .options([(
                "statement_timeout",
                config.statement_timeout_ms.to_string(),
            )]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| Error::persistence(format!("database connect failed: {e}")))?;

        info!(max_connections = config.max_connections, "Connected to Postgres");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::persistence(format!("migration failed: {e}")))?;

        info!("Migrations up to date");

        Ok(Self { pool, config })
    }

    /// Wrap an existing pool (tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            config: StoreConfig::default(),
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
