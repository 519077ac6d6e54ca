//! Store health check.

use tracing::debug;

use crate::client::PgStore;

/// Check database connectivity with a trivial round trip.
pub async fn check_connection(store: &PgStore) -> bool {
    match sqlx::query("SELECT 1").execute(store.pool()).await {
        Ok(_) => {
            debug!("Postgres health check passed");
            true
        }
        Err(e) => {
            debug!(error = %e, "Postgres health check failed");
            false
        }
    }
}
