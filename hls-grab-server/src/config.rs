//! Server configuration

use hls_grab_lib::PlannerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for one manifest request in seconds
    pub timeout_secs: u64,

    /// User agent when the form leaves it blank
    pub default_user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            default_user_agent: hls_grab_lib::headers::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Planner and engine settings
    pub planner: PlannerConfig,

    /// Manifest fetch settings
    pub fetch: FetchConfig,

    /// Engine stderr lines kept for error reports
    pub engine_tail_lines: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            planner: PlannerConfig::default(),
            fetch: FetchConfig::default(),
            engine_tail_lines: 20,
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `FFMPEG_BIN`, `DEBUG_FFMPEG`, `DISABLE_VARIANT` and `PORT`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin) = get("FFMPEG_BIN").filter(|b| !b.is_empty()) {
            self.planner.engine_binary_path = Some(PathBuf::from(bin));
        }
        if get("DEBUG_FFMPEG").as_deref() == Some("1") {
            self.planner.debug_logging = true;
        }
        if get("DISABLE_VARIANT").as_deref() == Some("1") {
            self.planner.disable_variant_selection = true;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
    }
}
