//! Postgres-backed implementation of the store contracts.

pub mod client;
pub mod config;
pub mod health;
mod rows;
mod store;

pub use client::PgStore;
pub use config::StoreConfig;
