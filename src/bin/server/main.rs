//! Varuna Lens HTTP Server
//!
//! Serves synthetic oceanographic data, summary statistics and an
//! interactive map over HTTP.
//!
//! # Endpoints
//!
//! ## Info
//! - `GET /` - Service metadata and routes
//! - `GET /health` - Health check
//!
//! ## Map datasets
//! - `GET /api/map/interactive` - Interactive Leaflet map
//! - `GET /api/floats` - ARGO float markers
//! - `GET /api/data/temperature` - Temperature heatmap points
//! - `GET /api/data/salinity` - Salinity heatmap points
//! - `GET /api/trajectories` - Float trajectories
//!
//! ## Measurements
//! - `GET /api/measurements` - Filtered measurements
//! - `GET /api/statistics` - Summary statistics
//! - `POST /api/cache/refresh` - Regenerate the cached batch
//!
//! # CLI Commands
//!
//! - `start` - Start the HTTP server (default if no command specified)
//! - `check-config` - Validate configuration
//! - `stats` - Summarize a freshly generated batch without starting the server
//! - `render-map` - Write the interactive map to a file
//!
//! # Configuration
//!
//! The server reads configuration from:
//! 1. `--config` path
//! 2. `VARUNA_CONFIG` environment variable (path to TOML file)
//! 3. `./application.toml` in current directory
//! 4. Default configuration

mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::{load_config_with_app, ServerConfig};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::signal;
use tracing::{debug, info, warn};
use varuna_lens::{
    aggregation::summarize,
    api::{build_router, AppState},
    source::{
        MeasurementSource, SampleDataGenerator, DEFAULT_FLOAT_COUNT, DEFAULT_SALINITY_POINTS,
        DEFAULT_TEMPERATURE_POINTS, DEFAULT_TRAJECTORY_COUNT,
    },
    visualization::OceanMap,
};

// =============================================================================
// CLI Definition
// =============================================================================

/// Varuna Lens - oceanographic data API
#[derive(Parser)]
#[command(name = "varuna-lens")]
#[command(version)]
#[command(about = "Synthetic oceanographic data, statistics and maps over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (overrides VARUNA_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long, global = true)]
    listen: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Start,

    /// Validate configuration without starting the server
    CheckConfig,

    /// Summarize a freshly generated batch without starting the server
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the interactive map page to a file
    RenderMap {
        /// Output HTML file
        #[arg(short, long, default_value = "ocean_map.html")]
        output: PathBuf,

        /// Add the salinity heatmap
        #[arg(long)]
        salinity: bool,

        /// Add float trajectories
        #[arg(long)]
        trajectories: bool,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn generator(seed: Option<u64>) -> SampleDataGenerator {
    seed.map_or_else(SampleDataGenerator::new, SampleDataGenerator::with_seed)
}

// =============================================================================
// CLI Command Handlers
// =============================================================================

/// Validate configuration and print summary
fn cmd_check_config(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (config, app_config) = load_config_with_app(cli.config.as_deref());
    app_config.validate()?;

    println!("Configuration is valid!");
    println!();
    println!("Server Settings:");
    println!("  Listen address: {}", config.listen_addr);
    println!("  Log level: {}", config.log_level);
    println!();
    println!("Cache Settings:");
    println!("  Staleness window: {}s", app_config.cache.staleness_secs);
    println!("  Batch size: {}", app_config.cache.batch_size);
    println!();
    println!("Map Settings:");
    println!(
        "  Center: {:.3}°, {:.3}° (zoom {})",
        app_config.map.center_lat, app_config.map.center_lon, app_config.map.zoom
    );
    println!();
    println!("Security:");
    if app_config.security.cors_allowed_origins.is_empty() {
        println!("  CORS: any origin");
    } else {
        println!(
            "  CORS origins: {}",
            app_config.security.cors_allowed_origins.join(", ")
        );
    }

    Ok(())
}

/// Summarize one generated batch
fn cmd_stats(
    cli: &Cli,
    format: OutputFormat,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, app_config) = load_config_with_app(cli.config.as_deref());
    let batch = generator(seed).generate_measurements(app_config.cache.batch_size);
    let stats = summarize(&batch);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Varuna Lens Statistics");
    println!("======================");
    println!();
    println!("Measurements: {}", stats.total_measurements);
    if let Some(range) = stats.date_range {
        println!("Date range: {} .. {}", range.start, range.end);
    }
    if let Some(c) = stats.spatial_coverage {
        println!(
            "Coverage: N {:.2} S {:.2} E {:.2} W {:.2}",
            c.north, c.south, c.east, c.west
        );
    }
    println!();
    println!("Parameters:");
    for (name, p) in &stats.parameters {
        println!(
            "  {:<18} n={:<5} min={:<8.2} max={:<8.2} mean={:.2} {}",
            name.as_str(),
            p.count,
            p.min,
            p.max,
            p.mean,
            p.unit
        );
    }
    if let Some(quality) = &stats.quality_distribution {
        println!();
        println!("Quality flags:");
        for (flag, count) in quality {
            println!("  {:<14} {}", flag, count);
        }
    }

    Ok(())
}

/// Render the interactive map to a file
fn cmd_render_map(
    cli: &Cli,
    output: &Path,
    salinity: bool,
    trajectories: bool,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, app_config) = load_config_with_app(cli.config.as_deref());
    let generator = generator(seed);

    let mut map = OceanMap::new(
        app_config.map.center_lat,
        app_config.map.center_lon,
        app_config.map.zoom,
    )
    .with_floats(generator.generate_floats(DEFAULT_FLOAT_COUNT))
    .with_temperature_heatmap(generator.generate_temperature_heatmap(DEFAULT_TEMPERATURE_POINTS));
    if salinity {
        map = map
            .with_salinity_heatmap(generator.generate_salinity_heatmap(DEFAULT_SALINITY_POINTS));
    }
    if trajectories {
        map = map.with_trajectories(generator.generate_trajectories(DEFAULT_TRAJECTORY_COUNT));
    }

    let html = map.render()?;
    std::fs::write(output, &html)?;
    println!("Wrote {} bytes to {}", html.len(), output.display());
    Ok(())
}

// =============================================================================
// Server Setup
// =============================================================================

/// Graceful shutdown signal handler
///
/// If a handler cannot be installed the failure is logged and that signal
/// source waits forever instead of panicking.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {},
            Err(e) => {
                warn!(
                    error = %e,
                    "Ctrl+C handler installation failed - graceful shutdown unavailable"
                );
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!(
                    error = %e,
                    "SIGTERM handler installation failed - SIGTERM shutdown unavailable"
                );
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::CheckConfig) => return cmd_check_config(&cli),
        Some(Commands::Stats { format, seed }) => return cmd_stats(&cli, *format, *seed),
        Some(Commands::RenderMap {
            output,
            salinity,
            trajectories,
            seed,
        }) => return cmd_render_map(&cli, output, *salinity, *trajectories, *seed),
        Some(Commands::Start) | None => {
            // Continue with server startup below
        },
    }

    let (mut config, mut app_config) = load_config_with_app(cli.config.as_deref());
    if let Some(listen) = &cli.listen {
        config.listen_addr = listen.clone();
        app_config.server.listen_addr = listen.clone();
    }

    init_tracing(&config);
    app_config.validate()?;

    info!("Starting Varuna Lens Server v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        listen_addr = %config.listen_addr,
        staleness_secs = app_config.cache.staleness_secs,
        batch_size = app_config.cache.batch_size,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(app_config));
    let app = build_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
