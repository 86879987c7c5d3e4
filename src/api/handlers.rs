//! HTTP handlers
//!
//! Map dataset routes draw fresh random data from the generator on every
//! call. Measurement and statistics routes go through the cached batch.

use super::types::*;
use super::AppState;
use crate::aggregation::Statistics;
use crate::source::{
    DEFAULT_FLOAT_COUNT, DEFAULT_SALINITY_POINTS, DEFAULT_TEMPERATURE_POINTS,
    DEFAULT_TRAJECTORY_COUNT,
};
use crate::types::{
    validate_latitude, validate_longitude, FloatMarker, FloatTrajectory, HeatmapPoint,
};
use crate::visualization::OceanMap;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
    Json,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Service Info
// =============================================================================

/// Service metadata and known routes
pub async fn root() -> Json<RootResponse> {
    let endpoints = BTreeMap::from([
        ("health", "/health"),
        ("interactive_map", "/api/map/interactive"),
        ("argo_floats", "/api/floats"),
        ("temperature_data", "/api/data/temperature"),
        ("salinity_data", "/api/data/salinity"),
        ("trajectories", "/api/trajectories"),
        ("measurements", "/api/measurements"),
        ("statistics", "/api/statistics"),
        ("cache_refresh", "/api/cache/refresh"),
    ]);
    Json(RootResponse {
        message: "Varuna Lens Oceanographic Data API",
        version: env!("CARGO_PKG_VERSION"),
        status: "active",
        endpoints,
    })
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

// =============================================================================
// Map Datasets
// =============================================================================

/// Interactive map page
pub async fn interactive_map(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MapParams>, QueryRejection>,
) -> ApiResult<Html<String>> {
    let Query(params) = params?;
    let center_lat = validate_latitude(
        "center_lat",
        params.center_lat.unwrap_or(state.config.map.center_lat),
    )?;
    let center_lon = validate_longitude(
        "center_lon",
        params.center_lon.unwrap_or(state.config.map.center_lon),
    )?;

    let generator = &state.generator;
    let mut map = OceanMap::new(center_lat, center_lon, state.config.map.zoom)
        .with_floats(generator.generate_floats(DEFAULT_FLOAT_COUNT));
    if params.include_temperature {
        map = map.with_temperature_heatmap(
            generator.generate_temperature_heatmap(DEFAULT_TEMPERATURE_POINTS),
        );
    }
    if params.include_salinity {
        map = map
            .with_salinity_heatmap(generator.generate_salinity_heatmap(DEFAULT_SALINITY_POINTS));
    }
    if params.include_trajectories {
        map = map.with_trajectories(generator.generate_trajectories(DEFAULT_TRAJECTORY_COUNT));
    }

    let html = map
        .render()
        .map_err(|e| ApiError::internal("Error generating map", e))?;
    debug!(
        center_lat,
        center_lon,
        bytes = html.len(),
        "Rendered interactive map"
    );
    Ok(Html(html))
}

/// Float markers, optionally filtered by status
pub async fn floats(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FloatParams>, QueryRejection>,
) -> ApiResult<Json<Vec<FloatMarker>>> {
    let Query(params) = params?;
    let limit = validate_limit("limit", params.limit, 1, 200)?;

    // An empty `status=` means no filter
    let status = params.status.as_deref().filter(|s| !s.is_empty());

    let floats = state
        .generator
        .generate_floats(DEFAULT_FLOAT_COUNT)
        .into_iter()
        .filter(|f| status.map_or(true, |s| f.status.as_str() == s))
        .take(limit)
        .collect();
    Ok(Json(floats))
}

/// Temperature heatmap points
pub async fn temperature_data(State(state): State<Arc<AppState>>) -> Json<Vec<HeatmapPoint>> {
    Json(
        state
            .generator
            .generate_temperature_heatmap(DEFAULT_TEMPERATURE_POINTS),
    )
}

/// Salinity heatmap points
pub async fn salinity_data(State(state): State<Arc<AppState>>) -> Json<Vec<HeatmapPoint>> {
    Json(state.generator.generate_salinity_heatmap(DEFAULT_SALINITY_POINTS))
}

/// Float trajectories, optionally restricted to a set of float ids
pub async fn trajectories(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TrajectoryParams>, QueryRejection>,
) -> ApiResult<Json<Vec<FloatTrajectory>>> {
    let Query(params) = params?;
    let limit = validate_limit("limit", params.limit, 1, 20)?;

    let requested: Option<HashSet<&str>> = params
        .float_ids
        .as_deref()
        .filter(|ids| !ids.trim().is_empty())
        .map(|ids| ids.split(',').map(str::trim).filter(|s| !s.is_empty()).collect());

    let trajectories = state
        .generator
        .generate_trajectories(DEFAULT_TRAJECTORY_COUNT)
        .into_iter()
        .filter(|t| {
            requested
                .as_ref()
                .map_or(true, |ids| ids.contains(t.float_id.as_str()))
        })
        .take(limit)
        .collect();
    Ok(Json(trajectories))
}

// =============================================================================
// Measurements
// =============================================================================

/// Filtered measurements from the cached batch
pub async fn measurements(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MeasurementParams>, QueryRejection>,
) -> ApiResult<Json<MeasurementsResponse>> {
    let Query(params) = params?;
    let query = params.to_query()?;
    let limit = params.limit()?;

    let mut measurements = state.service.query_measurements(&query);
    measurements.truncate(limit);
    Ok(Json(MeasurementsResponse {
        count: measurements.len(),
        measurements,
    }))
}

/// Summary statistics of the filtered cached batch
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MeasurementParams>, QueryRejection>,
) -> ApiResult<Json<Statistics>> {
    let Query(params) = params?;
    let query = params.to_query()?;
    Ok(Json(state.service.statistics_for(&query)))
}

/// Regenerate the cached batch
pub async fn refresh_cache(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let store = state.service.store();
    let batch = store.refresh();
    info!(size = batch.len(), "Measurement cache refreshed on request");
    Json(RefreshResponse {
        status: "refreshed",
        batch: store.batch_info(),
        stats: store.stats(),
    })
}
