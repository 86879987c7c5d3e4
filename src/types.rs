//! Core data types used throughout the service
//!
//! # Key Types
//!
//! - **`Measurement`**: one oceanographic observation (time, place, parameters, flags, metadata)
//! - **`Location`**: validated latitude/longitude/depth triple
//! - **`ParameterName`**: closed set of the eight measurable parameters
//! - **`QualityFlag`**: IODE quality code (lower is better)
//! - **`FloatMarker`**, **`HeatmapPoint`**, **`FloatTrajectory`**: map datasets
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use varuna_lens::types::{Location, Measurement, OceanographicParameters};
//!
//! let location = Location::new(15.0, 68.0, 10.0).unwrap();
//! let measurement = Measurement::new(Utc::now(), location).with_parameters(
//!     OceanographicParameters {
//!         temperature: Some(28.4),
//!         ..Default::default()
//!     },
//! );
//! assert_eq!(measurement.parameters.temperature, Some(28.4));
//! ```

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Valid latitude domain in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude domain in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Check a latitude against its domain
pub fn validate_latitude(field: &str, value: f64) -> Result<f64, ValidationError> {
    let (min, max) = LATITUDE_RANGE;
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(field, value, min, max))
    }
}

/// Check a longitude against its domain
pub fn validate_longitude(field: &str, value: f64) -> Result<f64, ValidationError> {
    let (min, max) = LONGITUDE_RANGE;
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(field, value, min, max))
    }
}

// =============================================================================
// Quality Flags
// =============================================================================

/// IODE quality flag
///
/// Serialized as its numeric code. Lower codes mean higher confidence:
/// `Good < ProbablyGood < Bad < Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QualityFlag {
    /// Good data (1)
    Good = 1,
    /// Probably good data (2)
    ProbablyGood = 2,
    /// Bad data (4)
    Bad = 4,
    /// Missing value (9)
    Missing = 9,
}

impl QualityFlag {
    /// Numeric IODE code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Canonical upper-case name (`GOOD`, `PROBABLY_GOOD`, ...)
    pub fn name(self) -> &'static str {
        match self {
            QualityFlag::Good => "GOOD",
            QualityFlag::ProbablyGood => "PROBABLY_GOOD",
            QualityFlag::Bad => "BAD",
            QualityFlag::Missing => "MISSING",
        }
    }

    /// True when this flag is at least as good as `threshold`
    pub fn meets(self, threshold: QualityFlag) -> bool {
        self.code() <= threshold.code()
    }
}

impl From<QualityFlag> for u8 {
    fn from(flag: QualityFlag) -> Self {
        flag.code()
    }
}

impl TryFrom<u8> for QualityFlag {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(QualityFlag::Good),
            2 => Ok(QualityFlag::ProbablyGood),
            4 => Ok(QualityFlag::Bad),
            9 => Ok(QualityFlag::Missing),
            other => Err(ValidationError::invalid_format(
                "quality_flag",
                format!("{} is not one of 1, 2, 4, 9", other),
            )),
        }
    }
}

impl FromStr for QualityFlag {
    type Err = ValidationError;

    /// Accepts either the flag name (case-insensitive) or its numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return QualityFlag::try_from(code);
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "GOOD" => Ok(QualityFlag::Good),
            "PROBABLY_GOOD" => Ok(QualityFlag::ProbablyGood),
            "BAD" => Ok(QualityFlag::Bad),
            "MISSING" => Ok(QualityFlag::Missing),
            _ => Err(ValidationError::invalid_format(
                "quality_threshold",
                format!("unknown quality flag '{}'", trimmed),
            )),
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-parameter quality flags
///
/// Only the four routinely flagged parameters carry a flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// Temperature flag
    pub temperature: Option<QualityFlag>,
    /// Salinity flag
    pub salinity: Option<QualityFlag>,
    /// pH flag
    pub ph: Option<QualityFlag>,
    /// Dissolved oxygen flag
    pub dissolved_oxygen: Option<QualityFlag>,
}

impl QualityFlags {
    /// Iterate the flags that are present, in field order
    pub fn present(&self) -> impl Iterator<Item = QualityFlag> {
        [self.temperature, self.salinity, self.ph, self.dissolved_oxygen]
            .into_iter()
            .flatten()
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// The eight measurable parameters of a measurement's parameter bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterName {
    /// Sea water temperature
    Temperature,
    /// Practical salinity
    Salinity,
    /// pH
    Ph,
    /// Dissolved oxygen
    DissolvedOxygen,
    /// Turbidity
    Turbidity,
    /// Conductivity
    Conductivity,
    /// Sea pressure
    Pressure,
    /// Chlorophyll-a concentration
    ChlorophyllA,
}

impl ParameterName {
    /// Every parameter, in parameter-bag order
    pub const ALL: [ParameterName; 8] = [
        ParameterName::Temperature,
        ParameterName::Salinity,
        ParameterName::Ph,
        ParameterName::DissolvedOxygen,
        ParameterName::Turbidity,
        ParameterName::Conductivity,
        ParameterName::Pressure,
        ParameterName::ChlorophyllA,
    ];

    /// Parameters reported by the statistics aggregator
    pub const SUMMARIZED: [ParameterName; 4] = [
        ParameterName::Temperature,
        ParameterName::Salinity,
        ParameterName::Ph,
        ParameterName::DissolvedOxygen,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterName::Temperature => "temperature",
            ParameterName::Salinity => "salinity",
            ParameterName::Ph => "ph",
            ParameterName::DissolvedOxygen => "dissolved_oxygen",
            ParameterName::Turbidity => "turbidity",
            ParameterName::Conductivity => "conductivity",
            ParameterName::Pressure => "pressure",
            ParameterName::ChlorophyllA => "chlorophyll_a",
        }
    }

    /// Physical unit label
    pub fn unit(self) -> &'static str {
        match self {
            ParameterName::Temperature => "°C",
            ParameterName::Salinity => "PSU",
            ParameterName::Ph => "pH units",
            ParameterName::DissolvedOxygen => "mg/L",
            ParameterName::Turbidity => "NTU",
            ParameterName::Conductivity => "mS/cm",
            ParameterName::Pressure => "dbar",
            ParameterName::ChlorophyllA => "mg/m³",
        }
    }

    /// Read this parameter out of a parameter bag
    pub fn value_in(self, parameters: &OceanographicParameters) -> Option<f64> {
        match self {
            ParameterName::Temperature => parameters.temperature,
            ParameterName::Salinity => parameters.salinity,
            ParameterName::Ph => parameters.ph,
            ParameterName::DissolvedOxygen => parameters.dissolved_oxygen,
            ParameterName::Turbidity => parameters.turbidity,
            ParameterName::Conductivity => parameters.conductivity,
            ParameterName::Pressure => parameters.pressure,
            ParameterName::ChlorophyllA => parameters.chlorophyll_a,
        }
    }

    /// Parse a comma-separated list, ignoring blank entries
    pub fn parse_list(list: &str) -> Result<Vec<ParameterName>, ValidationError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for ParameterName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ParameterName::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownParameter(s.trim().to_string()))
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter bag of a measurement; every value is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OceanographicParameters {
    /// Temperature in °C
    pub temperature: Option<f64>,
    /// Salinity in PSU
    pub salinity: Option<f64>,
    /// pH
    pub ph: Option<f64>,
    /// Dissolved oxygen in mg/L
    pub dissolved_oxygen: Option<f64>,
    /// Turbidity in NTU
    pub turbidity: Option<f64>,
    /// Conductivity in mS/cm
    pub conductivity: Option<f64>,
    /// Pressure in dbar
    pub pressure: Option<f64>,
    /// Chlorophyll-a in mg/m³
    pub chlorophyll_a: Option<f64>,
}

impl OceanographicParameters {
    /// Whether a named parameter has a value
    pub fn has(&self, parameter: ParameterName) -> bool {
        parameter.value_in(self).is_some()
    }
}

// =============================================================================
// Location and Metadata
// =============================================================================

/// Validated measurement position
///
/// Latitude and longitude are always inside their domains and depth is
/// never negative; the only way in is [`Location::new`] (or deserialization,
/// which goes through the same checks).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    latitude: f64,
    longitude: f64,
    depth: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    depth: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = ValidationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.latitude, raw.longitude, raw.depth)
    }
}

impl Location {
    /// Create a location, rejecting out-of-domain coordinates and negative depth
    pub fn new(latitude: f64, longitude: f64, depth: f64) -> Result<Self, ValidationError> {
        let latitude = validate_latitude("latitude", latitude)?;
        let longitude = validate_longitude("longitude", longitude)?;
        if !depth.is_finite() || depth < 0.0 {
            return Err(ValidationError::out_of_range("depth", depth, 0, "inf"));
        }
        Ok(Self {
            latitude,
            longitude,
            depth,
        })
    }

    /// Latitude in degrees north
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees east
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Depth in meters below the surface
    pub fn depth(&self) -> f64 {
        self.depth
    }
}

/// Observing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Autonomous profiling float
    Float,
    /// Research vessel
    Ship,
    /// Underwater glider
    Glider,
    /// Fixed mooring
    Mooring,
}

/// Data processing level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingLevel {
    /// Unprocessed instrument output
    Raw,
    /// Passed quality control
    QualityControlled,
    /// Derived product
    Derived,
}

/// Provenance of a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Instrument type (e.g. "CTD", "ARGO_FLOAT")
    pub instrument_type: String,
    /// Observing platform
    pub platform: Platform,
    /// Cruise identifier
    pub cruise_id: Option<String>,
    /// Station identifier
    pub station_id: Option<String>,
    /// Originating data source (e.g. "IMOS")
    pub data_source: Option<String>,
    /// Processing level
    pub processing_level: ProcessingLevel,
}

// =============================================================================
// Measurement
// =============================================================================

/// A single oceanographic measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Observation position
    pub location: Location,
    /// Measured values
    pub parameters: OceanographicParameters,
    /// Per-parameter quality flags
    pub quality_flags: Option<QualityFlags>,
    /// Provenance
    pub metadata: Option<Metadata>,
}

impl Measurement {
    /// Create a measurement with an empty parameter bag and no flags or metadata
    pub fn new(timestamp: DateTime<Utc>, location: Location) -> Self {
        Self {
            timestamp,
            location,
            parameters: OceanographicParameters::default(),
            quality_flags: None,
            metadata: None,
        }
    }

    /// Set the parameter bag
    pub fn with_parameters(mut self, parameters: OceanographicParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the quality flags
    pub fn with_quality_flags(mut self, flags: QualityFlags) -> Self {
        self.quality_flags = Some(flags);
        self
    }

    /// Set the metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Present quality flags, in field order
    pub fn present_flags(&self) -> impl Iterator<Item = QualityFlag> + '_ {
        self.quality_flags.iter().flat_map(|flags| flags.present())
    }

    /// Data source string, when metadata carries one
    pub fn data_source(&self) -> Option<&str> {
        self.metadata.as_ref()?.data_source.as_deref()
    }
}

// =============================================================================
// Map Datasets
// =============================================================================

/// Operational status of an ARGO float
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatStatus {
    /// Reporting normally
    Active,
    /// Not reporting
    Inactive,
    /// Under maintenance
    Maintenance,
}

impl FloatStatus {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            FloatStatus::Active => "active",
            FloatStatus::Inactive => "inactive",
            FloatStatus::Maintenance => "maintenance",
        }
    }

    /// Title-cased label for display
    pub fn label(self) -> &'static str {
        match self {
            FloatStatus::Active => "Active",
            FloatStatus::Inactive => "Inactive",
            FloatStatus::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for FloatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current position and latest surface values of an ARGO float
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatMarker {
    /// Float identifier (e.g. "F001")
    pub id: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Latest temperature in °C
    pub temperature: Option<f64>,
    /// Latest salinity in PSU
    pub salinity: Option<f64>,
    /// Operational status
    pub status: FloatStatus,
    /// Time of the last report
    pub last_update: Option<DateTime<Utc>>,
    /// Depth of the latest report in meters
    pub depth: Option<f64>,
}

/// Located scalar for continuous-field visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Scalar value
    pub value: f64,
    /// Which parameter the value measures
    pub parameter: ParameterName,
}

/// One reported position of a float
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Report time
    pub timestamp: DateTime<Utc>,
}

/// Time-ordered positions reported by one float
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatTrajectory {
    /// Float identifier
    pub float_id: String,
    /// Positions, oldest first
    pub points: Vec<TrajectoryPoint>,
}
