//! Server Configuration
//!
//! Resolves which configuration file to load. Runs before tracing is
//! installed, so progress is reported on stderr.

use std::path::{Path, PathBuf};
use varuna_lens::config::ApplicationConfig;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "VARUNA_CONFIG";

/// Default configuration file in the working directory
const DEFAULT_CONFIG_FILE: &str = "application.toml";

/// Server runtime settings derived from ApplicationConfig
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server address
    pub listen_addr: String,

    /// Fallback tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl From<&ApplicationConfig> for ServerConfig {
    fn from(app_config: &ApplicationConfig) -> Self {
        Self {
            listen_addr: app_config.server.listen_addr.clone(),
            log_level: app_config.server.log_level.clone(),
        }
    }
}

/// Load configuration from file or environment
///
/// Priority:
/// 1. `--config` path
/// 2. `VARUNA_CONFIG` environment variable
/// 3. `./application.toml`
/// 4. Defaults
///
/// Environment overrides apply in every case.
pub fn load_config_with_app(cli_path: Option<&Path>) -> (ServerConfig, ApplicationConfig) {
    let explicit: Option<PathBuf> = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    if let Some(path) = explicit {
        match ApplicationConfig::load(&path) {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from: {}", path.display());
                return (ServerConfig::from(&config), config);
            },
            Err(e) => {
                eprintln!(
                    "[config] Failed to load config from {}: {}. Trying defaults.",
                    path.display(),
                    e
                );
            },
        }
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        match ApplicationConfig::load(default_path) {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from {}", DEFAULT_CONFIG_FILE);
                return (ServerConfig::from(&config), config);
            },
            Err(e) => {
                eprintln!(
                    "[config] Failed to parse {}: {}. Using defaults.",
                    DEFAULT_CONFIG_FILE, e
                );
            },
        }
    }

    eprintln!("[config] Using default configuration");
    let app_config = match ApplicationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[config] Failed to apply environment overrides: {}", e);
            ApplicationConfig::default()
        },
    };
    (ServerConfig::from(&app_config), app_config)
}
