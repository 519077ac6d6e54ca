//! Unified error types for the telemetry pipeline.
//!
//! The taxonomy follows the propagation policy of the pipeline:
//! - `Validation` and `Persistence` are record-level; they are collected
//!   into the sync result and never abort a batch.
//! - `Configuration` is fatal at startup, before any record is processed.
//! - `Authorization` is rejected at the HTTP boundary, before the
//!   orchestrator is invoked.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the telemetry pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed or missing field in one vendor record.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// A store operation failed (connectivity, constraint, timeout).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Missing required credentials or settings at process start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Boundary-level rejection before the orchestrator runs.
    #[error("unauthorized: {0}")]
    Authorization(String),

    /// The vendor telemetry API could not be reached or answered badly.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: msg.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Validation {
            message: format!("required field '{field}' is missing"),
            field,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Whether this error may abort a whole run.
    ///
    /// Everything except `Configuration` is scoped to a single record,
    /// asset, or request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Get the HTTP status code for this error at the boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Serialization(_) => 400,
            Self::Authorization(_) => 401,
            Self::Persistence(_) => 500,
            Self::Configuration(_) => 500,
            Self::Provider(_) => 502,
        }
    }
}
