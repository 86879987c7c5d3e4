//! Request and response types for the HTTP API

use crate::cache::{BatchInfo, StoreStatsSnapshot};
use crate::error::ValidationError;
use crate::query::{DepthRange, MeasurementQuery, SpatialBounds, TemporalBounds};
use crate::types::{
    validate_latitude, validate_longitude, Measurement, ParameterName, QualityFlag,
    LATITUDE_RANGE, LONGITUDE_RANGE,
};
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::error;

// =============================================================================
// Errors
// =============================================================================

/// Error body, `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description
    pub detail: String,
}

/// Failure of an API call
#[derive(Debug)]
pub enum ApiError {
    /// Rejected request parameters (422)
    Validation(String),
    /// Unexpected failure while serving a valid request (500)
    Internal {
        /// What the handler was doing
        context: &'static str,
        /// Underlying error text
        message: String,
    },
}

impl ApiError {
    /// Wrap an unexpected error with the handler's context
    pub fn internal(context: &'static str, err: impl Display) -> Self {
        ApiError::Internal {
            context,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal { context, message } => {
                error!(context, error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{context}: {message}"),
                )
            },
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// =============================================================================
// Service Info
// =============================================================================

/// `GET /` response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Service name
    pub message: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Always `active`
    pub status: &'static str,
    /// Route name to path
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// `GET /health` response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy`
    pub status: &'static str,
    /// Server time
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Map Datasets
// =============================================================================

/// Query parameters for `GET /api/map/interactive`
#[derive(Debug, Deserialize)]
pub struct MapParams {
    /// Map center latitude (configured default when absent)
    #[serde(default)]
    pub center_lat: Option<f64>,
    /// Map center longitude (configured default when absent)
    #[serde(default)]
    pub center_lon: Option<f64>,
    /// Add the temperature heatmap and legend (default on)
    #[serde(default = "default_true", deserialize_with = "query_bool")]
    pub include_temperature: bool,
    /// Add the salinity heatmap
    #[serde(default, deserialize_with = "query_bool")]
    pub include_salinity: bool,
    /// Add float trajectories
    #[serde(default, deserialize_with = "query_bool")]
    pub include_trajectories: bool,
}

fn default_true() -> bool {
    true
}

/// Query-string boolean: `true/false`, `1/0`, `yes/no` or `on/off`, any case
fn query_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let lowered = raw.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"one of true/false, 1/0, yes/no, on/off",
        )),
    }
}

/// Query parameters for `GET /api/floats`
#[derive(Debug, Deserialize)]
pub struct FloatParams {
    /// Exact status match (`active`, `inactive`, `maintenance`)
    #[serde(default)]
    pub status: Option<String>,
    /// Maximum floats returned, 1..=200
    #[serde(default = "default_float_limit")]
    pub limit: usize,
}

fn default_float_limit() -> usize {
    50
}

/// Query parameters for `GET /api/trajectories`
#[derive(Debug, Deserialize)]
pub struct TrajectoryParams {
    /// Comma-separated float ids
    #[serde(default)]
    pub float_ids: Option<String>,
    /// Maximum trajectories returned, 1..=20
    #[serde(default = "default_trajectory_limit")]
    pub limit: usize,
}

fn default_trajectory_limit() -> usize {
    10
}

/// Check `value` lies in `min..=max`
pub fn validate_limit(
    field: &str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<usize, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(field, value, min, max))
    }
}

// =============================================================================
// Measurements
// =============================================================================

/// Largest `limit` accepted by `GET /api/measurements`
pub const MAX_MEASUREMENT_LIMIT: usize = 1000;

/// Default `limit` for `GET /api/measurements`
pub const DEFAULT_MEASUREMENT_LIMIT: usize = 500;

/// Filter parameters shared by `/api/measurements` and `/api/statistics`
#[derive(Debug, Default, Deserialize)]
pub struct MeasurementParams {
    /// Northern edge, defaults to 90
    #[serde(default)]
    pub north: Option<f64>,
    /// Southern edge, defaults to -90
    #[serde(default)]
    pub south: Option<f64>,
    /// Eastern edge, defaults to 180
    #[serde(default)]
    pub east: Option<f64>,
    /// Western edge, defaults to -180
    #[serde(default)]
    pub west: Option<f64>,
    /// RFC 3339 lower time bound
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// RFC 3339 upper time bound
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Shallowest depth in meters, defaults to 0
    #[serde(default)]
    pub min_depth: Option<f64>,
    /// Deepest depth in meters, unbounded by default
    #[serde(default)]
    pub max_depth: Option<f64>,
    /// Flag name (`GOOD`) or code (`1`)
    #[serde(default)]
    pub quality_threshold: Option<String>,
    /// Comma-separated parameter names
    #[serde(default)]
    pub parameters: Option<String>,
    /// Maximum measurements returned (ignored by `/api/statistics`)
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MeasurementParams {
    /// Validate and convert into a filter query
    ///
    /// A missing spatial side defaults to its domain bound, a missing time
    /// bound leaves that end open, a missing depth bound defaults to the
    /// surface or to unbounded depth.
    pub fn to_query(&self) -> Result<MeasurementQuery, ValidationError> {
        let mut query = MeasurementQuery::new();

        let sides = [self.north, self.south, self.east, self.west];
        if sides.iter().any(Option::is_some) {
            query = query.with_spatial_bounds(SpatialBounds::new(
                bound("north", self.north, LATITUDE_RANGE.1, validate_latitude)?,
                bound("south", self.south, LATITUDE_RANGE.0, validate_latitude)?,
                bound("east", self.east, LONGITUDE_RANGE.1, validate_longitude)?,
                bound("west", self.west, LONGITUDE_RANGE.0, validate_longitude)?,
            ));
        }

        if self.start.is_some() || self.end.is_some() {
            query = query.with_temporal_bounds(TemporalBounds::new(
                self.start.unwrap_or(DateTime::<Utc>::MIN_UTC),
                self.end.unwrap_or(DateTime::<Utc>::MAX_UTC),
            ));
        }

        if self.min_depth.is_some() || self.max_depth.is_some() {
            let min = non_negative("min_depth", self.min_depth.unwrap_or(0.0))?;
            let max = non_negative("max_depth", self.max_depth.unwrap_or(f64::INFINITY))?;
            query = query.with_depth_range(DepthRange::new(min, max));
        }

        if let Some(threshold) = self.quality_threshold.as_deref() {
            query = query.with_quality_threshold(threshold.parse::<QualityFlag>()?);
        }

        if let Some(list) = self.parameters.as_deref() {
            let parameters = ParameterName::parse_list(list)?;
            if !parameters.is_empty() {
                query = query.with_required_parameters(parameters);
            }
        }

        Ok(query)
    }

    /// Validated result limit
    pub fn limit(&self) -> Result<usize, ValidationError> {
        validate_limit(
            "limit",
            self.limit.unwrap_or(DEFAULT_MEASUREMENT_LIMIT),
            1,
            MAX_MEASUREMENT_LIMIT,
        )
    }
}

type Check = fn(&str, f64) -> Result<f64, ValidationError>;

fn bound(
    field: &str,
    value: Option<f64>,
    default: f64,
    check: Check,
) -> Result<f64, ValidationError> {
    value.map_or(Ok(default), |v| check(field, v))
}

fn non_negative(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(field, value, 0, "inf"))
    }
}

/// `GET /api/measurements` response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeasurementsResponse {
    /// Number of measurements returned
    pub count: usize,
    /// Matching measurements, batch order
    pub measurements: Vec<Measurement>,
}

/// `POST /api/cache/refresh` response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Always `refreshed`
    pub status: &'static str,
    /// The newly installed batch
    pub batch: Option<BatchInfo>,
    /// Store counters after the refresh
    pub stats: StoreStatsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_params(query: &str) -> Result<MapParams, QueryRejection> {
        let uri: axum::http::Uri = format!("/api/map/interactive?{query}").parse().unwrap();
        axum::extract::Query::<MapParams>::try_from_uri(&uri).map(|q| q.0)
    }

    #[test]
    fn test_map_flags_accept_common_spellings() {
        let query = "include_salinity=1&include_trajectories=YES&include_temperature=off";
        let params = map_params(query).unwrap();
        assert!(params.include_salinity);
        assert!(params.include_trajectories);
        assert!(!params.include_temperature);

        let params = map_params("include_salinity=on&include_temperature=0").unwrap();
        assert!(params.include_salinity);
        assert!(!params.include_temperature);
    }

    #[test]
    fn test_map_flags_default_when_absent() {
        let params = map_params("center_lat=12.0").unwrap();
        assert!(params.include_temperature);
        assert!(!params.include_salinity);
        assert!(!params.include_trajectories);
    }

    #[test]
    fn test_map_flag_rejects_unknown_spelling() {
        assert!(map_params("include_salinity=maybe").is_err());
    }

    #[test]
    fn test_empty_params_give_empty_query() {
        let query = MeasurementParams::default().to_query().unwrap();
        assert!(query.is_empty());
        assert_eq!(MeasurementParams::default().limit().unwrap(), 500);
    }

    #[test]
    fn test_partial_spatial_bounds_default_to_domain() {
        let params = MeasurementParams {
            north: Some(20.0),
            west: Some(60.0),
            ..Default::default()
        };
        let bounds = params.to_query().unwrap().spatial_bounds.unwrap();
        assert_eq!(bounds, SpatialBounds::new(20.0, -90.0, 180.0, 60.0));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let params = MeasurementParams {
            south: Some(-91.0),
            ..Default::default()
        };
        assert!(matches!(
            params.to_query(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_depth_defaults() {
        let params = MeasurementParams {
            max_depth: Some(100.0),
            ..Default::default()
        };
        let range = params.to_query().unwrap().depth_range.unwrap();
        assert_eq!(range, DepthRange::new(0.0, 100.0));

        let params = MeasurementParams {
            min_depth: Some(-5.0),
            ..Default::default()
        };
        assert!(params.to_query().is_err());
    }

    #[test]
    fn test_quality_and_parameters_parsing() {
        let params = MeasurementParams {
            quality_threshold: Some("2".to_string()),
            parameters: Some("temperature, ph".to_string()),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(query.quality_threshold, Some(QualityFlag::ProbablyGood));
        assert_eq!(
            query.parameters,
            Some(vec![ParameterName::Temperature, ParameterName::Ph])
        );

        let unknown = MeasurementParams {
            parameters: Some("temperature,salt".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            unknown.to_query(),
            Err(ValidationError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_limit_bounds() {
        let over = MeasurementParams {
            limit: Some(1001),
            ..Default::default()
        };
        assert!(over.limit().is_err());
        assert!(validate_limit("limit", 0, 1, 200).is_err());
        assert_eq!(validate_limit("limit", 200, 1, 200).unwrap(), 200);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let response =
            ApiError::from(ValidationError::UnknownParameter("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let response = ApiError::internal("Error generating map", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
