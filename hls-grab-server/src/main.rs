//! hls-grab server
//!
//! Web form that turns a player session descriptor into a single MP4/MKV
//! download, using the hls-grab-lib planner and an external ffmpeg.

mod config;
mod config_file;
mod engine;
mod error;
mod fetch;
mod http;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-grab-server";

#[tokio::main]
async fn main() -> Result<()> {
    // `hls-grab-server --write-config <path>` writes the defaults and exits
    let mut args = std::env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--write-config") {
        let path = args.next().unwrap_or_else(|| "config.toml".to_string());
        crate::config_file::generate_default_config(&path)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        println!("Wrote default configuration to {}", path);
        return Ok(());
    }

    let config_path = first.unwrap_or_else(|| "config.toml".to_string());
    let mut config = load_config(&config_path);

    // Initialize logging
    init_logging(&config);
    config.apply_env();

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::info!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));
    match &state.engine {
        Some(engine) => tracing::info!("Engine binary: {}", engine.display()),
        None => tracing::warn!("ffmpeg not found; downloads will fail until it is installed"),
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid listen address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_config(path: &str) -> ServerConfig {
    if !std::path::Path::new(path).exists() {
        return ServerConfig::default();
    }
    match crate::config_file::ConfigFile::from_file(path) {
        Ok(cf) => cf.into_server_config(),
        Err(e) => {
            // Logging is not up yet.
            eprintln!(
                "Failed to load config file {}: {}. Using defaults.",
                path, e
            );
            ServerConfig::default()
        }
    }
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let default_filter = format!(
        "hls_grab_server={level},hls_grab_lib={level},tower_http={level}",
        level = config.log_level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
