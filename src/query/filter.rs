//! Filter - predicate evaluation over measurements
//!
//! Each active constraint of a [`MeasurementQuery`] becomes one
//! [`Predicate`]. A measurement survives when every predicate passes;
//! evaluation stops at the first failure. Output order always matches input
//! order.

use super::criteria::{DepthRange, MeasurementQuery, SpatialBounds, TemporalBounds};
use crate::types::{Measurement, ParameterName, QualityFlag};

/// A single measurement constraint
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Position inside a box
    Spatial(SpatialBounds),
    /// Timestamp inside a window
    Temporal(TemporalBounds),
    /// Depth inside an interval
    Depth(DepthRange),
    /// At least one present flag at or better than the threshold
    Quality(QualityFlag),
    /// Every listed parameter present
    RequiredParameters(Vec<ParameterName>),
}

impl Predicate {
    /// Evaluate against one measurement
    pub fn evaluate(&self, m: &Measurement) -> bool {
        match self {
            Predicate::Spatial(bounds) => {
                bounds.contains(m.location.latitude(), m.location.longitude())
            },
            Predicate::Temporal(bounds) => bounds.contains(m.timestamp),
            Predicate::Depth(range) => range.contains(m.location.depth()),
            // No present flags means no evidence of quality: fail
            Predicate::Quality(threshold) => m.present_flags().any(|f| f.meets(*threshold)),
            Predicate::RequiredParameters(required) => {
                required.iter().all(|p| m.parameters.has(*p))
            },
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Spatial(_) => "spatial",
            Predicate::Temporal(_) => "temporal",
            Predicate::Depth(_) => "depth",
            Predicate::Quality(_) => "quality",
            Predicate::RequiredParameters(_) => "required_parameters",
        }
    }
}

impl MeasurementQuery {
    /// Active constraints as predicates, in evaluation order
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(5);
        if let Some(bounds) = self.spatial_bounds {
            predicates.push(Predicate::Spatial(bounds));
        }
        if let Some(bounds) = self.temporal_bounds {
            predicates.push(Predicate::Temporal(bounds));
        }
        if let Some(range) = self.depth_range {
            predicates.push(Predicate::Depth(range));
        }
        if let Some(threshold) = self.quality_threshold {
            predicates.push(Predicate::Quality(threshold));
        }
        if let Some(parameters) = self.parameters.as_ref().filter(|p| !p.is_empty()) {
            predicates.push(Predicate::RequiredParameters(parameters.clone()));
        }
        predicates
    }
}

/// Conjunctive filter built from a query
#[derive(Debug, Clone, Default)]
pub struct MeasurementFilter {
    predicates: Vec<Predicate>,
}

impl MeasurementFilter {
    /// Build a filter from a list of predicates
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Build a filter from a query
    pub fn from_query(query: &MeasurementQuery) -> Self {
        Self::new(query.predicates())
    }

    /// Predicates in evaluation order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when the filter passes everything
    pub fn is_pass_through(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Check if a measurement passes all predicates
    pub fn matches(&self, m: &Measurement) -> bool {
        self.predicates.iter().all(|p| p.evaluate(m))
    }

    /// Surviving measurements, order preserved
    pub fn apply(&self, measurements: &[Measurement]) -> Vec<Measurement> {
        // Pass-through without evaluating anything
        if self.is_pass_through() {
            return measurements.to_vec();
        }
        measurements
            .iter()
            .filter(|m| self.matches(m))
            .cloned()
            .collect()
    }

    /// Number of surviving measurements, without copying them
    pub fn count(&self, measurements: &[Measurement]) -> usize {
        measurements.iter().filter(|m| self.matches(m)).count()
    }
}

/// Filter `measurements` by `query`, preserving order
pub fn filter_measurements(
    query: &MeasurementQuery,
    measurements: &[Measurement],
) -> Vec<Measurement> {
    MeasurementFilter::from_query(query).apply(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, OceanographicParameters, QualityFlags};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn measurement(lat: f64, lon: f64, depth: f64, hours: i64) -> Measurement {
        Measurement::new(
            base_time() + Duration::hours(hours),
            Location::new(lat, lon, depth).unwrap(),
        )
    }

    fn fixture() -> Vec<Measurement> {
        vec![
            measurement(10.0, 65.0, 5.0, 0)
                .with_parameters(OceanographicParameters {
                    temperature: Some(28.0),
                    salinity: Some(35.0),
                    ..Default::default()
                })
                .with_quality_flags(QualityFlags {
                    temperature: Some(QualityFlag::Good),
                    salinity: Some(QualityFlag::Bad),
                    ..Default::default()
                }),
            measurement(20.0, 85.0, 150.0, 24)
                .with_parameters(OceanographicParameters {
                    temperature: Some(26.0),
                    ..Default::default()
                })
                .with_quality_flags(QualityFlags {
                    temperature: Some(QualityFlag::ProbablyGood),
                    ..Default::default()
                }),
            measurement(15.0, 70.0, 50.0, 48).with_quality_flags(QualityFlags {
                ph: Some(QualityFlag::Missing),
                ..Default::default()
            }),
            measurement(-5.0, 100.0, 0.0, 72),
        ]
    }

    #[test]
    fn test_empty_query_is_identity() {
        let data = fixture();
        assert_eq!(filter_measurements(&MeasurementQuery::new(), &data), data);
    }

    #[test]
    fn test_spatial_filter() {
        let data = fixture();
        let query = MeasurementQuery::new()
            .with_spatial_bounds(SpatialBounds::new(20.0, 10.0, 80.0, 60.0));
        let result = filter_measurements(&query, &data);
        assert_eq!(result, vec![data[0].clone(), data[2].clone()]);
    }

    #[test]
    fn test_inverted_spatial_bounds_yield_empty() {
        let data = fixture();
        let query = MeasurementQuery::new()
            .with_spatial_bounds(SpatialBounds::new(-90.0, 90.0, 180.0, -180.0));
        assert!(filter_measurements(&query, &data).is_empty());
    }

    #[test]
    fn test_temporal_filter_inclusive() {
        let data = fixture();
        let query = MeasurementQuery::new().with_temporal_bounds(TemporalBounds::new(
            base_time() + Duration::hours(24),
            base_time() + Duration::hours(48),
        ));
        let result = filter_measurements(&query, &data);
        assert_eq!(result, vec![data[1].clone(), data[2].clone()]);
    }

    #[test]
    fn test_depth_filter_inclusive() {
        let data = fixture();
        let query = MeasurementQuery::new().with_depth_range(DepthRange::new(0.0, 50.0));
        let result = filter_measurements(&query, &data);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|m| m.location.depth() <= 50.0));
    }

    #[test]
    fn test_quality_any_flag_semantics() {
        let data = fixture();

        // Record 0 has GOOD temperature next to BAD salinity and still passes
        let good = MeasurementQuery::new().with_quality_threshold(QualityFlag::Good);
        assert_eq!(filter_measurements(&good, &data), vec![data[0].clone()]);

        let probably = MeasurementQuery::new().with_quality_threshold(QualityFlag::ProbablyGood);
        assert_eq!(filter_measurements(&probably, &data).len(), 2);

        // Records with no flags never pass, even the loosest threshold
        let missing = MeasurementQuery::new().with_quality_threshold(QualityFlag::Missing);
        let result = filter_measurements(&missing, &data);
        assert_eq!(result.len(), 3);
        assert!(!result.contains(&data[3]));
    }

    #[test]
    fn test_required_parameters_all_must_be_present() {
        let data = fixture();
        let query = MeasurementQuery::new()
            .with_required_parameters(vec![ParameterName::Temperature, ParameterName::Salinity]);
        assert_eq!(filter_measurements(&query, &data), vec![data[0].clone()]);

        let turbidity =
            MeasurementQuery::new().with_required_parameters(vec![ParameterName::Turbidity]);
        assert!(filter_measurements(&turbidity, &data).is_empty());
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let data = fixture();
        let query = MeasurementQuery::new()
            .with_depth_range(DepthRange::new(0.0, 200.0))
            .with_quality_threshold(QualityFlag::ProbablyGood)
            .with_required_parameters(vec![ParameterName::Temperature])
            .with_spatial_bounds(SpatialBounds::new(25.0, 15.0, 90.0, 60.0));
        assert_eq!(filter_measurements(&query, &data), vec![data[1].clone()]);
    }

    #[test]
    fn test_predicate_order() {
        let query = MeasurementQuery::new()
            .with_required_parameters(vec![ParameterName::Ph])
            .with_quality_threshold(QualityFlag::Good)
            .with_spatial_bounds(SpatialBounds::global());
        let names: Vec<&str> = query.predicates().iter().map(Predicate::name).collect();
        assert_eq!(names, vec!["spatial", "quality", "required_parameters"]);
    }

    #[test]
    fn test_count_matches_apply() {
        let data = fixture();
        let filter = MeasurementFilter::from_query(
            &MeasurementQuery::new().with_depth_range(DepthRange::new(1.0, 100.0)),
        );
        assert_eq!(filter.count(&data), filter.apply(&data).len());
    }
}
