//! Component health registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;

/// Health of one dependency.
#[derive(Debug, Default)]
pub struct ComponentHealth {
    healthy: AtomicBool,
    message: Mutex<Option<String>>,
}

impl ComponentHealth {
    pub fn set_healthy(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        *self.message.lock() = None;
    }

    pub fn set_unhealthy(&self, message: impl Into<String>) {
        self.healthy.store(false, Ordering::Relaxed);
        *self.message.lock() = Some(message.into());
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn message(&self) -> Option<String> {
        self.message.lock().clone()
    }
}

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Snapshot of the registry for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub postgres: bool,
    pub provider: bool,
}

/// Health registry for the pipeline's dependencies.
#[derive(Debug, Default)]
pub struct Health {
    pub postgres: ComponentHealth,
    /// Vendor API reachability. Only the scheduled-pull path needs it, so a
    /// sick provider degrades the service instead of failing readiness.
    pub provider: ComponentHealth,
}

impl Health {
    pub fn report(&self) -> HealthReport {
        let postgres = self.postgres.is_healthy();
        let provider = self.provider.is_healthy();
        let status = if postgres && provider {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        HealthReport {
            status,
            postgres,
            provider,
        }
    }

    /// Ready to take traffic: the store must be reachable.
    pub fn is_ready(&self) -> bool {
        self.postgres.is_healthy()
    }

    /// The process itself is running.
    pub fn is_alive(&self) -> bool {
        true
    }
}

static HEALTH: OnceLock<Health> = OnceLock::new();

/// Global health registry.
pub fn health() -> &'static Health {
    HEALTH.get_or_init(Health::default)
}
