//! Measurement sources
//!
//! The measurement store does not know where its batches come from; it asks a
//! [`MeasurementSource`] for a fresh batch whenever the cached one goes stale.
//!
//! - [`SampleDataGenerator`]: randomized synthetic data (the production source)
//! - [`StaticSource`]: a fixed batch, for tests and reproducible demos

mod sample;

pub use sample::{
    Region, SampleDataGenerator, ARABIAN_SEA, BAY_OF_BENGAL, DEFAULT_FLOAT_COUNT,
    DEFAULT_SALINITY_POINTS, DEFAULT_TEMPERATURE_POINTS, DEFAULT_TRAJECTORY_COUNT,
};

use crate::types::Measurement;

/// Strategy that produces batches of measurements
pub trait MeasurementSource: Send + Sync {
    /// Produce a batch of `count` measurements
    ///
    /// Implementations may return fewer records when they cannot produce
    /// `count` (a fixed fixture, for instance).
    fn generate_measurements(&self, count: usize) -> Vec<Measurement>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Source that always returns the same fixture batch
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    measurements: Vec<Measurement>,
}

impl StaticSource {
    /// Wrap a fixture batch
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }
}

impl MeasurementSource for StaticSource {
    fn generate_measurements(&self, count: usize) -> Vec<Measurement> {
        self.measurements.iter().take(count).cloned().collect()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
