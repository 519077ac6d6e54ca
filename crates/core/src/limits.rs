//! Size limits for the ingestion path.
//!
//! Vendor gateways batch aggressively after connectivity gaps, so the caps
//! here are sized for the largest catch-up batches seen in practice, not the
//! steady-state drip of one reading per tank per hour.
//!
//! The `#[validate]` derive macro requires literal values in attributes, so
//! string-length limits are duplicated there. Keep both in sync when
//! modifying.

/// Maximum webhook payload size in bytes (1MB).
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Maximum vendor records per batch.
pub const MAX_BATCH_RECORDS: usize = 500;

/// Errors/warnings reported back to the caller are capped to the first N
/// entries to bound response size. The full lists still land in the sync log
/// counts and the process log.
pub const MAX_REPORTED_ISSUES: usize = 5;

/// Trailing window for burn-rate estimation, in days.
pub const ANALYTICS_WINDOW_DAYS: i64 = 7;

/// Display-name and address fields from vendors.
pub const MAX_NAME_LEN: usize = 200;

/// Device serial numbers.
pub const MAX_SERIAL_LEN: usize = 64;
