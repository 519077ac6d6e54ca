//! Observability for the Tankwatch pipeline: structured logging via
//! `tracing`, in-process atomic metrics, and a component health registry.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::{health, Health, HealthReport, HealthStatus};
pub use metrics::{metrics, Metrics, MetricsSnapshot};
pub use tracing_setup::{init_tracing, init_tracing_from_env, TracingConfig};
