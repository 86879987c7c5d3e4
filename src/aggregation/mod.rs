//! Summary statistics
//!
//! Reduces a measurement collection into counts, ranges, means and
//! distributions:
//!
//! ```text
//! [Measurement] ──summarize──▶ Statistics
//!                               ├─ total_measurements
//!                               ├─ date_range / spatial_coverage
//!                               ├─ parameters (temperature, salinity, ph, dissolved_oxygen)
//!                               └─ data_sources / quality_distribution
//! ```

mod statistics;

pub use statistics::{summarize, DateRange, ParameterStatistics, SpatialCoverage, Statistics};
