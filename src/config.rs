//! Configuration management for the Varuna Lens service
//!
//! This module provides configuration file support with TOML format,
//! environment variable overrides, and sensible defaults.

use crate::error::{Error, Result, ValidationError};
use crate::types::{validate_latitude, validate_longitude};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Deepest zoom level the map tile layers serve
pub const MAX_ZOOM: u8 = 18;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApplicationConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerSection,

    /// Measurement cache configuration
    #[serde(default)]
    pub cache: CacheSection,

    /// Interactive map defaults
    #[serde(default)]
    pub map: MapSection,

    /// Security settings
    #[serde(default)]
    pub security: SecuritySection,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Measurement cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSection {
    /// Age in seconds after which the cached batch is regenerated
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,

    /// Number of measurements generated per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Interactive map defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapSection {
    /// Default center latitude
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    /// Default center longitude
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Security configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecuritySection {
    /// CORS allowed origins (empty = allow any origin)
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

// Default value functions
fn default_listen_addr() -> String { "0.0.0.0:8000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_staleness_secs() -> u64 { 15 * 60 }
fn default_batch_size() -> usize { 500 }
fn default_center_lat() -> f64 { 15.0 }
fn default_center_lon() -> f64 { 68.0 }
fn default_zoom() -> u8 { 6 }
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://varuna-lens.vercel.app".to_string(),
    ]
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            staleness_secs: default_staleness_secs(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
        }
    }
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

impl CacheSection {
    /// Staleness window as a `Duration`
    pub fn staleness_window(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }
}

impl ApplicationConfig {
    /// Load configuration from a TOML file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            Error::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("VARUNA_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Ok(level) = std::env::var("VARUNA_LOG_LEVEL") {
            self.server.log_level = level;
        }
        if let Ok(secs) = std::env::var("VARUNA_CACHE_STALENESS_SECS") {
            self.cache.staleness_secs = secs.parse().map_err(|_| {
                Error::Configuration(format!(
                    "VARUNA_CACHE_STALENESS_SECS is not a number: {}",
                    secs
                ))
            })?;
        }
        if let Ok(size) = std::env::var("VARUNA_CACHE_BATCH_SIZE") {
            self.cache.batch_size = size.parse().map_err(|_| {
                Error::Configuration(format!("VARUNA_CACHE_BATCH_SIZE is not a number: {}", size))
            })?;
        }
        if let Ok(origins) = std::env::var("VARUNA_CORS_ORIGINS") {
            self.security.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache.batch_size == 0 {
            return Err(Error::Configuration("Cache batch size must be > 0".to_string()));
        }
        if self.cache.staleness_secs == 0 {
            return Err(Error::Configuration(
                "Cache staleness window must be > 0 seconds".to_string(),
            ));
        }
        validate_latitude("map.center_lat", self.map.center_lat)?;
        validate_longitude("map.center_lon", self.map.center_lon)?;
        if self.map.zoom > MAX_ZOOM {
            return Err(
                ValidationError::out_of_range("map.zoom", self.map.zoom, 0, MAX_ZOOM).into(),
            );
        }
        if self.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::Configuration(format!(
                "Invalid listen address: {}",
                self.server.listen_addr
            )));
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApplicationConfig::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.cache.staleness_window(), Duration::from_secs(900));
        assert_eq!(config.cache.batch_size, 500);
        assert_eq!(config.security.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn test_config_validation() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = ApplicationConfig::default();
        config.cache.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_center_rejected() {
        let mut config = ApplicationConfig::default();
        config.map.center_lat = 120.0;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_zoom_beyond_tile_range_rejected() {
        let mut config = ApplicationConfig::default();
        config.map.zoom = MAX_ZOOM;
        assert!(config.validate().is_ok());

        config.map.zoom = 200;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
            [cache]
            staleness_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.staleness_secs, 60);
        assert_eq!(config.cache.batch_size, 500);
        assert_eq!(config.map.zoom, 6);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("application.toml");

        let mut config = ApplicationConfig::default();
        config.cache.batch_size = 42;
        config.security.cors_allowed_origins.clear();
        config.save_to_file(&path).unwrap();

        let loaded = ApplicationConfig::from_file(&path).unwrap();
        assert_eq!(loaded.cache.batch_size, 42);
        assert!(loaded.security.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ApplicationConfig::from_file("/nonexistent/varuna.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
