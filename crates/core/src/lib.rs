//! Core types, normalization, and store contracts for the Tankwatch pipeline.

pub mod error;
pub mod limits;
pub mod model;
pub mod normalize;
pub mod raw;
pub mod store;
pub mod thresholds;

pub use error::{Error, Result};
pub use model::*;
pub use normalize::{normalize, AssetDraft, LocationDraft, NormalizedRecord, ReadingDraft};
pub use raw::{RawRecord, VendorPayload};
pub use store::*;
pub use thresholds::AlertThresholds;
