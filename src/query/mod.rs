//! Measurement selection
//!
//! A [`MeasurementQuery`] describes which measurements a caller wants; a
//! [`MeasurementFilter`] turns it into predicates and applies them.
//!
//! ```text
//! MeasurementQuery ──predicates()──▶ [Predicate] ──MeasurementFilter──▶ Vec<Measurement>
//! ```
//!
//! # Example
//!
//! ```rust
//! use varuna_lens::query::{filter_measurements, DepthRange, MeasurementQuery};
//!
//! let query = MeasurementQuery::new().with_depth_range(DepthRange::new(0.0, 100.0));
//! let survivors = filter_measurements(&query, &[]);
//! assert!(survivors.is_empty());
//! ```

mod criteria;
mod filter;

pub use criteria::{DepthRange, MeasurementQuery, SpatialBounds, TemporalBounds};
pub use filter::{filter_measurements, MeasurementFilter, Predicate};
