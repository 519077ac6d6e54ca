//! The Tankwatch ingestion-and-analytics pipeline.
//!
//! One [`orchestrator::IngestOrchestrator`] per process sequences a batch
//! through normalization, persistence, consumption analytics, and alert
//! evaluation, tolerating per-record failure throughout.

pub mod alerts;
pub mod analytics;
pub mod orchestrator;

pub use alerts::AlertGenerator;
pub use analytics::{AnalyticsConfig, ConsumptionEngine, Estimate};
pub use orchestrator::IngestOrchestrator;
