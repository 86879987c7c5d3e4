//! Synthetic oceanographic data for the northern Indian Ocean
//!
//! All values are drawn from uniform distributions inside realistic
//! tropical ranges. Positions fall in either the Arabian Sea or the Bay of
//! Bengal with equal probability.

use super::MeasurementSource;
use crate::types::{
    FloatMarker, FloatStatus, FloatTrajectory, HeatmapPoint, Location, Measurement, Metadata,
    OceanographicParameters, ParameterName, Platform, ProcessingLevel, QualityFlag, QualityFlags,
    TrajectoryPoint,
};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Rectangular sampling region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Southern edge
    pub lat_min: f64,
    /// Northern edge
    pub lat_max: f64,
    /// Western edge
    pub lon_min: f64,
    /// Eastern edge
    pub lon_max: f64,
}

impl Region {
    fn sample<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        (
            rng.random_range(self.lat_min..self.lat_max),
            rng.random_range(self.lon_min..self.lon_max),
        )
    }

    /// Whether a position lies inside the region (edges inclusive)
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Arabian Sea sampling box
pub const ARABIAN_SEA: Region = Region {
    lat_min: 8.0,
    lat_max: 25.0,
    lon_min: 60.0,
    lon_max: 78.0,
};

/// Bay of Bengal sampling box
pub const BAY_OF_BENGAL: Region = Region {
    lat_min: 5.0,
    lat_max: 22.0,
    lon_min: 78.0,
    lon_max: 95.0,
};

const TEMPERATURE_RANGE: (f64, f64) = (24.0, 32.0);
const SALINITY_RANGE: (f64, f64) = (33.5, 37.0);
const PH_RANGE: (f64, f64) = (7.8, 8.3);
const OXYGEN_RANGE: (f64, f64) = (4.0, 8.5);
const CHLOROPHYLL_RANGE: (f64, f64) = (0.1, 2.0);

const FLOAT_IDS: [&str; 16] = [
    "F001", "F002", "F003", "F004", "F005", "F006", "F007", "F008", "F009", "F010", "F011",
    "F012", "F013", "F014", "F015", "F016",
];

const INSTRUMENTS: [&str; 4] = ["CTD", "ARGO_FLOAT", "GLIDER", "MOORING"];
const PLATFORMS: [Platform; 3] = [Platform::Float, Platform::Ship, Platform::Glider];

/// Trajectory positions are clamped to this box after each drift step
const TRAJECTORY_BOUNDS: Region = Region {
    lat_min: 5.0,
    lat_max: 25.0,
    lon_min: 60.0,
    lon_max: 95.0,
};

/// Default number of floats
pub const DEFAULT_FLOAT_COUNT: usize = 16;
/// Default number of temperature heatmap points
pub const DEFAULT_TEMPERATURE_POINTS: usize = 200;
/// Default number of salinity heatmap points
pub const DEFAULT_SALINITY_POINTS: usize = 150;
/// Default number of trajectories
pub const DEFAULT_TRAJECTORY_COUNT: usize = 6;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn uniform<R: Rng>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    rng.random_range(min..max)
}

/// Pick `Good` with probability `good_in_ten / 10`, else `ProbablyGood`
fn weighted_flag<R: Rng>(rng: &mut R, good_in_ten: u32) -> QualityFlag {
    if rng.random_range(0..10) < good_in_ten {
        QualityFlag::Good
    } else {
        QualityFlag::ProbablyGood
    }
}

/// Randomized generator for every dataset the service exposes
///
/// Thread-safe: the RNG sits behind a mutex so one generator can be shared
/// across request handlers.
pub struct SampleDataGenerator {
    rng: Mutex<StdRng>,
}

impl Default for SampleDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleDataGenerator {
    /// Generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn random_region<R: Rng>(rng: &mut R) -> Region {
        if rng.random_bool(0.5) {
            ARABIAN_SEA
        } else {
            BAY_OF_BENGAL
        }
    }

    /// Simple climatology: cooler to the north, Arabian Sea warmer than the Bay
    pub fn temperature_for_location(lat: f64, lon: f64) -> f64 {
        let base_temp = 30.0;
        let lat_effect = -(lat - 10.0) * 0.2;
        let lon_effect = if lon < 78.0 { 0.5 } else { -0.3 };
        base_temp + lat_effect + lon_effect
    }

    /// ARGO float markers, at most one per known float id
    pub fn generate_floats(&self, count: usize) -> Vec<FloatMarker> {
        let mut rng = self.rng.lock();
        let now = Utc::now();

        FLOAT_IDS
            .iter()
            .take(count)
            .map(|id| {
                let (latitude, longitude) = Self::random_region(&mut *rng).sample(&mut *rng);
                let temperature = round_to(uniform(&mut *rng, TEMPERATURE_RANGE), 1);
                let salinity = round_to(uniform(&mut *rng, SALINITY_RANGE), 1);

                // 7:2:1 active / inactive / maintenance
                let status = match rng.random_range(0..10) {
                    0..=6 => FloatStatus::Active,
                    7..=8 => FloatStatus::Inactive,
                    _ => FloatStatus::Maintenance,
                };
                let minutes_ago = rng.random_range(5..=1440);

                FloatMarker {
                    id: (*id).to_string(),
                    latitude,
                    longitude,
                    temperature: Some(temperature),
                    salinity: Some(salinity),
                    status,
                    last_update: Some(now - Duration::minutes(minutes_ago)),
                    depth: Some(rng.random_range(0.0..50.0)),
                }
            })
            .collect()
    }

    /// Temperature heatmap points with a latitude/longitude gradient
    pub fn generate_temperature_heatmap(&self, count: usize) -> Vec<HeatmapPoint> {
        let mut rng = self.rng.lock();
        (0..count)
            .map(|_| {
                let region = Self::random_region(&mut *rng);
                let (latitude, longitude) = region.sample(&mut *rng);
                let bias = if region == ARABIAN_SEA { 1.0 } else { -0.5 };
                let value = Self::temperature_for_location(latitude, longitude)
                    + bias
                    + rng.random_range(-1.0..1.0);

                HeatmapPoint {
                    latitude,
                    longitude,
                    value: round_to(value, 1),
                    parameter: ParameterName::Temperature,
                }
            })
            .collect()
    }

    /// Salinity heatmap points; the Bay of Bengal is fresher from river input
    pub fn generate_salinity_heatmap(&self, count: usize) -> Vec<HeatmapPoint> {
        let mut rng = self.rng.lock();
        (0..count)
            .map(|_| {
                let region = Self::random_region(&mut *rng);
                let (latitude, longitude) = region.sample(&mut *rng);
                let bias = if region == ARABIAN_SEA { 0.8 } else { -1.2 };
                let value = 35.0 + bias + rng.random_range(-0.5..0.5);

                HeatmapPoint {
                    latitude,
                    longitude,
                    value: round_to(value, 1),
                    parameter: ParameterName::Salinity,
                }
            })
            .collect()
    }

    /// Drifting float tracks over the last 30 days, one point every 3 days
    pub fn generate_trajectories(&self, count: usize) -> Vec<FloatTrajectory> {
        let mut rng = self.rng.lock();
        let start_time = Utc::now() - Duration::days(30);

        FLOAT_IDS
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, id)| {
                let region = if i % 2 == 0 { ARABIAN_SEA } else { BAY_OF_BENGAL };
                let (mut lat, mut lon) = region.sample(&mut *rng);

                let points = (0..30)
                    .step_by(3)
                    .map(|day| {
                        lat += rng.random_range(-0.1..0.1);
                        lon += rng.random_range(-0.1..0.1);
                        lat = lat.clamp(TRAJECTORY_BOUNDS.lat_min, TRAJECTORY_BOUNDS.lat_max);
                        lon = lon.clamp(TRAJECTORY_BOUNDS.lon_min, TRAJECTORY_BOUNDS.lon_max);

                        TrajectoryPoint {
                            latitude: lat,
                            longitude: lon,
                            timestamp: start_time + Duration::days(day),
                        }
                    })
                    .collect();

                FloatTrajectory {
                    float_id: (*id).to_string(),
                    points,
                }
            })
            .collect()
    }

    /// Full measurement records from the last week
    pub fn generate_sample_measurements(&self, count: usize) -> Vec<Measurement> {
        let mut rng = self.rng.lock();
        let now = Utc::now();
        let mut measurements = Vec::with_capacity(count);

        for _ in 0..count {
            let (lat, lon) = Self::random_region(&mut *rng).sample(&mut *rng);
            let depth = rng.random_range(0.0..200.0);
            let location = match Location::new(lat, lon, depth) {
                Ok(location) => location,
                Err(e) => {
                    warn!(error = %e, "Generated location outside domain, skipping record");
                    continue;
                },
            };

            let parameters = OceanographicParameters {
                temperature: Some(round_to(uniform(&mut *rng, TEMPERATURE_RANGE), 2)),
                salinity: Some(round_to(uniform(&mut *rng, SALINITY_RANGE), 2)),
                ph: Some(round_to(uniform(&mut *rng, PH_RANGE), 2)),
                dissolved_oxygen: Some(round_to(uniform(&mut *rng, OXYGEN_RANGE), 2)),
                turbidity: None,
                conductivity: None,
                pressure: Some(round_to(depth * 1.025, 1)),
                chlorophyll_a: Some(round_to(uniform(&mut *rng, CHLOROPHYLL_RANGE), 2)),
            };

            let quality_flags = QualityFlags {
                temperature: Some(weighted_flag(&mut *rng, 8)),
                salinity: Some(weighted_flag(&mut *rng, 8)),
                ph: Some(weighted_flag(&mut *rng, 7)),
                dissolved_oxygen: Some(weighted_flag(&mut *rng, 8)),
            };

            let metadata = Metadata {
                instrument_type: INSTRUMENTS[rng.random_range(0..INSTRUMENTS.len())].to_string(),
                platform: PLATFORMS[rng.random_range(0..PLATFORMS.len())],
                cruise_id: Some(format!("VL2024-{:03}", rng.random_range(1..=20))),
                station_id: Some(format!("STN-{:03}", rng.random_range(1..=100))),
                data_source: Some("IMOS".to_string()),
                processing_level: ProcessingLevel::QualityControlled,
            };

            let hours_ago = rng.random_range(1..=168);
            measurements.push(
                Measurement::new(now - Duration::hours(hours_ago), location)
                    .with_parameters(parameters)
                    .with_quality_flags(quality_flags)
                    .with_metadata(metadata),
            );
        }

        debug!(count = measurements.len(), "Generated sample measurements");
        measurements
    }
}

impl MeasurementSource for SampleDataGenerator {
    fn generate_measurements(&self, count: usize) -> Vec<Measurement> {
        self.generate_sample_measurements(count)
    }

    fn name(&self) -> &'static str {
        "sample"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_either_region(lat: f64, lon: f64) -> bool {
        ARABIAN_SEA.contains(lat, lon) || BAY_OF_BENGAL.contains(lat, lon)
    }

    #[test]
    fn test_floats_respect_ranges() {
        let generator = SampleDataGenerator::with_seed(7);
        let floats = generator.generate_floats(DEFAULT_FLOAT_COUNT);

        assert_eq!(floats.len(), 16);
        assert_eq!(floats[0].id, "F001");
        assert_eq!(floats[15].id, "F016");
        for f in &floats {
            assert!(in_either_region(f.latitude, f.longitude));
            let t = f.temperature.unwrap();
            assert!((24.0..=32.0).contains(&t));
            let s = f.salinity.unwrap();
            assert!((33.5..=37.0).contains(&s));
            assert!((0.0..50.0).contains(&f.depth.unwrap()));
        }
    }

    #[test]
    fn test_float_count_capped_by_known_ids() {
        let generator = SampleDataGenerator::with_seed(1);
        assert_eq!(generator.generate_floats(100).len(), 16);
        assert_eq!(generator.generate_floats(3).len(), 3);
    }

    #[test]
    fn test_heatmaps_tag_parameter() {
        let generator = SampleDataGenerator::with_seed(11);
        let temps = generator.generate_temperature_heatmap(DEFAULT_TEMPERATURE_POINTS);
        let salts = generator.generate_salinity_heatmap(DEFAULT_SALINITY_POINTS);

        assert_eq!(temps.len(), 200);
        assert_eq!(salts.len(), 150);
        assert!(temps.iter().all(|p| p.parameter == ParameterName::Temperature));
        assert!(salts.iter().all(|p| p.parameter == ParameterName::Salinity));
        // 35.0 + bias in [-1.2, 0.8] + noise in [-0.5, 0.5]
        assert!(salts.iter().all(|p| (33.3..=36.3).contains(&p.value)));
    }

    #[test]
    fn test_trajectories_are_time_ordered_and_clamped() {
        let generator = SampleDataGenerator::with_seed(3);
        let trajectories = generator.generate_trajectories(DEFAULT_TRAJECTORY_COUNT);

        assert_eq!(trajectories.len(), 6);
        for t in &trajectories {
            assert_eq!(t.points.len(), 10);
            assert!(t.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            assert!(t
                .points
                .iter()
                .all(|p| TRAJECTORY_BOUNDS.contains(p.latitude, p.longitude)));
        }
    }

    #[test]
    fn test_measurements_never_populate_turbidity_or_conductivity() {
        let generator = SampleDataGenerator::with_seed(42);
        let measurements = generator.generate_measurements(200);

        assert_eq!(measurements.len(), 200);
        for m in &measurements {
            assert!(m.parameters.turbidity.is_none());
            assert!(m.parameters.conductivity.is_none());
            assert!(m.parameters.temperature.is_some());
            assert_eq!(m.present_flags().count(), 4);
            assert!(m
                .present_flags()
                .all(|f| f == QualityFlag::Good || f == QualityFlag::ProbablyGood));
            assert_eq!(m.data_source(), Some("IMOS"));
            assert!((0.0..200.0).contains(&m.location.depth()));
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let a = SampleDataGenerator::with_seed(99).generate_salinity_heatmap(20);
        let b = SampleDataGenerator::with_seed(99).generate_salinity_heatmap(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_temperature_climatology() {
        // 30 - (10 - 10) * 0.2 + 0.5
        assert!((SampleDataGenerator::temperature_for_location(10.0, 70.0) - 30.5).abs() < 1e-9);
        // 30 - (20 - 10) * 0.2 - 0.3
        assert!((SampleDataGenerator::temperature_for_location(20.0, 85.0) - 27.7).abs() < 1e-9);
    }
}
