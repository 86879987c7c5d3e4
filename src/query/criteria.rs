//! Query criteria
//!
//! A [`MeasurementQuery`] is a conjunction of optional constraints. Absent
//! constraints impose no restriction, so the default query matches
//! everything.

use crate::types::{ParameterName, QualityFlag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude box, edges inclusive
///
/// No normalization happens here: a box with `south > north` or
/// `west > east` is accepted and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialBounds {
    /// Northern edge (max latitude)
    pub north: f64,
    /// Southern edge (min latitude)
    pub south: f64,
    /// Eastern edge (max longitude)
    pub east: f64,
    /// Western edge (min longitude)
    pub west: f64,
}

impl SpatialBounds {
    /// Create a bounding box
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// The whole globe
    pub fn global() -> Self {
        Self::new(90.0, -90.0, 180.0, -180.0)
    }

    /// Whether a position lies inside the box
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.south <= latitude
            && latitude <= self.north
            && self.west <= longitude
            && longitude <= self.east
    }
}

/// Time window, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalBounds {
    /// Earliest accepted instant
    pub start: DateTime<Utc>,
    /// Latest accepted instant
    pub end: DateTime<Utc>,
}

impl TemporalBounds {
    /// Create a time window
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether an instant falls in the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Depth interval in meters, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    /// Shallowest accepted depth
    pub min: f64,
    /// Deepest accepted depth
    pub max: f64,
}

impl DepthRange {
    /// Create a depth interval
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether a depth falls in the interval
    pub fn contains(&self, depth: f64) -> bool {
        self.min <= depth && depth <= self.max
    }
}

/// Conjunction of optional measurement constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementQuery {
    /// Spatial box
    pub spatial_bounds: Option<SpatialBounds>,
    /// Time window
    pub temporal_bounds: Option<TemporalBounds>,
    /// Depth interval
    pub depth_range: Option<DepthRange>,
    /// Minimum acceptable quality (any present flag at least this good)
    pub quality_threshold: Option<QualityFlag>,
    /// Parameters that must all be present
    pub parameters: Option<Vec<ParameterName>>,
}

impl MeasurementQuery {
    /// Query with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a spatial box
    pub fn with_spatial_bounds(mut self, bounds: SpatialBounds) -> Self {
        self.spatial_bounds = Some(bounds);
        self
    }

    /// Restrict to a time window
    pub fn with_temporal_bounds(mut self, bounds: TemporalBounds) -> Self {
        self.temporal_bounds = Some(bounds);
        self
    }

    /// Restrict to a depth interval
    pub fn with_depth_range(mut self, range: DepthRange) -> Self {
        self.depth_range = Some(range);
        self
    }

    /// Require at least one present flag at or better than `threshold`
    pub fn with_quality_threshold(mut self, threshold: QualityFlag) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// Require every listed parameter to be present
    pub fn with_required_parameters(mut self, parameters: Vec<ParameterName>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// True when no constraint is set (or only an empty parameter list)
    pub fn is_empty(&self) -> bool {
        self.spatial_bounds.is_none()
            && self.temporal_bounds.is_none()
            && self.depth_range.is_none()
            && self.quality_threshold.is_none()
            && self.parameters.as_ref().map_or(true, Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_spatial_bounds_inclusive_edges() {
        let bounds = SpatialBounds::new(20.0, 10.0, 75.0, 65.0);
        assert!(bounds.contains(20.0, 75.0));
        assert!(bounds.contains(10.0, 65.0));
        assert!(!bounds.contains(20.01, 70.0));
        assert!(!bounds.contains(15.0, 64.99));
    }

    #[test]
    fn test_inverted_bounds_contain_nothing() {
        let bounds = SpatialBounds::new(10.0, 20.0, 75.0, 65.0);
        assert!(!bounds.contains(15.0, 70.0));
        let bounds = SpatialBounds::new(20.0, 10.0, 65.0, 75.0);
        assert!(!bounds.contains(15.0, 70.0));
    }

    #[test]
    fn test_temporal_bounds_inclusive() {
        let start = Utc::now();
        let end = start + Duration::hours(1);
        let window = TemporalBounds::new(start, end);
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));
    }

    #[test]
    fn test_query_builder_and_emptiness() {
        assert!(MeasurementQuery::new().is_empty());
        assert!(MeasurementQuery::new()
            .with_required_parameters(vec![])
            .is_empty());
        assert!(!MeasurementQuery::new()
            .with_depth_range(DepthRange::new(0.0, 10.0))
            .is_empty());
    }
}
