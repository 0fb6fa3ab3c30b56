//! Application state
//!
//! Immutable after startup: the configuration, the planner built from it
//! and the engine binary found at startup. Requests share nothing else.

use std::path::PathBuf;

use hls_grab_lib::Planner;

use crate::config::ServerConfig;

/// Application state shared across all handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Planner configured from `config.planner`
    pub planner: Planner,

    /// Engine binary, None when neither configured nor on PATH
    pub engine: Option<PathBuf>,
}

impl AppState {
    /// Create a new AppState, locating the engine binary
    pub fn new(config: ServerConfig) -> Self {
        let planner = Planner::new(config.planner.clone());
        let engine = planner.engine_binary();
        Self {
            config,
            planner,
            engine,
        }
    }

    /// Create AppState with an explicit engine binary
    pub fn with_engine(config: ServerConfig, engine: Option<PathBuf>) -> Self {
        Self {
            planner: Planner::new(config.planner.clone()),
            config,
            engine,
        }
    }
}
