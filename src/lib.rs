//! Varuna Lens - oceanographic data service
//!
//! This library provides:
//! - A time-bounded, whole-batch cache of generated measurements
//! - A conjunctive spatial/temporal/depth/quality/parameter filter
//! - Summary statistics over measurement collections
//! - A Leaflet map renderer for floats, heatmaps and trajectories
//! - An axum HTTP API tying them together
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use varuna_lens::cache::StoreConfig;
//! use varuna_lens::query::{MeasurementQuery, SpatialBounds};
//! use varuna_lens::service::DataService;
//! use varuna_lens::source::SampleDataGenerator;
//!
//! let service = DataService::from_source(
//!     Arc::new(SampleDataGenerator::with_seed(7)),
//!     StoreConfig::default(),
//! );
//! let query = MeasurementQuery::new()
//!     .with_spatial_bounds(SpatialBounds::new(25.0, 8.0, 78.0, 60.0));
//! let arabian_sea = service.query_measurements(&query);
//! let stats = service.statistics_for(&query);
//! assert_eq!(stats.total_measurements, arabian_sea.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

/// Configuration management with TOML support
pub mod config;

/// Pluggable measurement sources
pub mod source;

/// Staleness-bounded measurement store
pub mod cache;

/// Measurement queries and the predicate filter
pub mod query;

/// Summary statistics aggregation
pub mod aggregation;

/// Store + filter + aggregator facade
pub mod service;

/// Interactive map rendering
pub mod visualization;

/// HTTP routes, handlers and wire types
pub mod api;

// Re-export main types
pub use aggregation::{summarize, Statistics};
pub use cache::MeasurementStore;
pub use error::{Error, Result};
pub use query::{filter_measurements, MeasurementQuery};
pub use service::DataService;
pub use types::{Measurement, ParameterName, QualityFlag};
