//! Summary statistics over a measurement collection
//!
//! [`summarize`] is total: every input, including an empty slice, yields a
//! defined [`Statistics`] value.

use crate::types::{Measurement, ParameterName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Output types
// ============================================================================

/// Earliest and latest timestamp in a collection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest timestamp
    pub start: DateTime<Utc>,
    /// Latest timestamp
    pub end: DateTime<Utc>,
}

/// Bounding box of every measurement position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialCoverage {
    /// Max latitude
    pub north: f64,
    /// Min latitude
    pub south: f64,
    /// Max longitude
    pub east: f64,
    /// Min longitude
    pub west: f64,
}

/// Count, range and mean of one parameter over the records where it is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStatistics {
    /// Records carrying the parameter
    pub count: usize,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Physical unit label
    pub unit: String,
}

/// Summary of a measurement collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of measurements
    pub total_measurements: usize,

    /// Timestamp range, `None` for an empty collection
    pub date_range: Option<DateRange>,

    /// Position bounding box, `None` for an empty collection
    pub spatial_coverage: Option<SpatialCoverage>,

    /// Per-parameter statistics; parameters absent from every record are omitted
    pub parameters: BTreeMap<ParameterName, ParameterStatistics>,

    /// Records per metadata data source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<BTreeMap<String, usize>>,

    /// Present quality flags per flag name, across all records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_distribution: Option<BTreeMap<String, usize>>,
}

impl Statistics {
    /// Statistics of an empty collection
    pub fn empty() -> Self {
        Self {
            total_measurements: 0,
            date_range: None,
            spatial_coverage: None,
            parameters: BTreeMap::new(),
            data_sources: None,
            quality_distribution: None,
        }
    }

    /// True when no measurement contributed
    pub fn is_empty(&self) -> bool {
        self.total_measurements == 0
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Accumulators
// ============================================================================

/// Running count/min/max/sum for one parameter
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: usize,
    min: f64,
    max: f64,
    sum: f64,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Self {
            count: 1,
            min: value,
            max: value,
            sum: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    fn finish(self, parameter: ParameterName) -> ParameterStatistics {
        ParameterStatistics {
            count: self.count,
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
            unit: parameter.unit().to_string(),
        }
    }
}

// ============================================================================
// Summarize
// ============================================================================

/// Reduce a collection to summary statistics in a single pass
pub fn summarize(measurements: &[Measurement]) -> Statistics {
    let Some(first) = measurements.first() else {
        return Statistics::empty();
    };

    let mut date_range = DateRange {
        start: first.timestamp,
        end: first.timestamp,
    };
    let mut coverage = SpatialCoverage {
        north: first.location.latitude(),
        south: first.location.latitude(),
        east: first.location.longitude(),
        west: first.location.longitude(),
    };
    let mut accumulators: BTreeMap<ParameterName, Accumulator> = BTreeMap::new();
    let mut data_sources: BTreeMap<String, usize> = BTreeMap::new();
    let mut quality: BTreeMap<String, usize> = BTreeMap::new();

    for m in measurements {
        date_range.start = date_range.start.min(m.timestamp);
        date_range.end = date_range.end.max(m.timestamp);

        let (lat, lon) = (m.location.latitude(), m.location.longitude());
        coverage.north = coverage.north.max(lat);
        coverage.south = coverage.south.min(lat);
        coverage.east = coverage.east.max(lon);
        coverage.west = coverage.west.min(lon);

        for parameter in ParameterName::SUMMARIZED {
            if let Some(value) = parameter.value_in(&m.parameters) {
                accumulators
                    .entry(parameter)
                    .and_modify(|acc| acc.push(value))
                    .or_insert_with(|| Accumulator::new(value));
            }
        }

        if let Some(source) = m.data_source() {
            *data_sources.entry(source.to_string()).or_insert(0) += 1;
        }

        for flag in m.present_flags() {
            *quality.entry(flag.name().to_string()).or_insert(0) += 1;
        }
    }

    Statistics {
        total_measurements: measurements.len(),
        date_range: Some(date_range),
        spatial_coverage: Some(coverage),
        parameters: accumulators
            .into_iter()
            .map(|(parameter, acc)| (parameter, acc.finish(parameter)))
            .collect(),
        data_sources: Some(data_sources),
        quality_distribution: Some(quality),
    }
}
