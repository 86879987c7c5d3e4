//! HTTP API
//!
//! # Endpoints
//!
//! - `GET /` - Service metadata
//! - `GET /health` - Health check
//! - `GET /api/map/interactive` - Leaflet map page
//! - `GET /api/floats` - ARGO float markers
//! - `GET /api/data/temperature` - Temperature heatmap points
//! - `GET /api/data/salinity` - Salinity heatmap points
//! - `GET /api/trajectories` - Float trajectories
//! - `GET /api/measurements` - Filtered measurements from the cached batch
//! - `GET /api/statistics` - Summary statistics of the filtered batch
//! - `POST /api/cache/refresh` - Regenerate the cached batch

pub mod handlers;
pub mod types;

use crate::cache::{MeasurementStore, StoreConfig};
use crate::config::ApplicationConfig;
use crate::service::DataService;
use crate::source::SampleDataGenerator;
use axum::{
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any as PanicPayload;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tracing::warn;

pub use types::{ApiError, ErrorResponse};

/// Shared handler state
pub struct AppState {
    /// Cached measurements, filter and aggregator
    pub service: DataService,
    /// Source of the map datasets
    pub generator: Arc<SampleDataGenerator>,
    /// Application configuration
    pub config: ApplicationConfig,
}

impl AppState {
    /// State whose store draws batches from the map generator
    pub fn new(config: ApplicationConfig) -> Self {
        let generator = Arc::new(SampleDataGenerator::new());
        let store_config = StoreConfig::default()
            .with_staleness_window(config.cache.staleness_window())
            .with_batch_size(config.cache.batch_size);
        let store = MeasurementStore::new(generator.clone(), store_config);
        Self::with_parts(DataService::new(Arc::new(store)), generator, config)
    }

    /// State from prebuilt parts
    pub fn with_parts(
        service: DataService,
        generator: Arc<SampleDataGenerator>,
        config: ApplicationConfig,
    ) -> Self {
        Self {
            service,
            generator,
            config,
        }
    }
}

/// Build CORS layer from configured origins
///
/// An empty list allows any origin without credentials.
pub fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    if cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            },
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Panic-to-response hook used by [`build_catch_panic_layer`]
pub type PanicHandler = fn(Box<dyn PanicPayload + Send>) -> Response;

/// Turn a handler panic into a 500 with the panic message
fn panic_response(payload: Box<dyn PanicPayload + Send>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::internal("Unhandled error", message).into_response()
}

/// Layer answering handler panics with a JSON 500 instead of dropping the connection
pub fn build_catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Map datasets
        .route("/api/map/interactive", get(handlers::interactive_map))
        .route("/api/floats", get(handlers::floats))
        .route("/api/data/temperature", get(handlers::temperature_data))
        .route("/api/data/salinity", get(handlers::salinity_data))
        .route("/api/trajectories", get(handlers::trajectories))
        // Cached measurements
        .route("/api/measurements", get(handlers::measurements))
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/cache/refresh", post(handlers::refresh_cache))
        .with_state(state.clone())
        .layer(build_catch_panic_layer())
        .layer(build_cors_layer(&state.config.security.cors_allowed_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn failing_handler() -> &'static str {
        panic!("sensor array offline")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        let router: Router = Router::new()
            .route("/boom", get(failing_handler))
            .layer(build_catch_panic_layer());

        let response = router
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.detail, "Unhandled error: sensor array offline");
    }

    #[test]
    fn test_unparseable_cors_origin_skipped() {
        // Building must not panic on a bad origin
        let _ = build_cors_layer(&["not a header\n".to_string(), "http://ok".to_string()]);
    }
}
