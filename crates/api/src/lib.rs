//! HTTP API layer for the Tankwatch pipeline.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AuthConfig};
