//! syncwatch-core — shared types for the syncwatch exporter.
//!
//! Holds the value types that flow through a poll cycle, the pure
//! normalizer that flattens controller `Application` documents, and the
//! exporter configuration with its JSON/TOML loaders.
//!
//! # Data flow
//!
//! ```text
//! TargetDescriptor ──fetch──▶ RawAppRecord (serde_json::Value)
//!                                   │
//!                             normalize()
//!                                   ▼
//!                            AppObservation ──▶ metric sink
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use config::{ExporterConfig, FileConfig};
pub use error::{ConfigError, ConfigResult};
pub use normalize::normalize;
pub use types::*;
