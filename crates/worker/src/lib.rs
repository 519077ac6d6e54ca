//! Background workers for the Tankwatch pipeline.
//!
//! - Poll worker: periodically pulls the latest vendor batch and feeds it
//!   through the same orchestrator contract the webhook uses.
//! - Recalc worker: periodically recomputes consumption for the whole
//!   active fleet and appends a sync-log row.

pub mod scheduler;

pub use scheduler::{WorkerConfig, WorkerScheduler};
