//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{FetchConfig, ServerConfig};
use hls_grab_lib::PlannerConfig;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Engine settings
    pub engine: Option<EngineSettings>,
    /// Manifest fetch settings
    pub fetch: Option<FetchSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Engine binary; searched on PATH when absent
    pub binary_path: Option<PathBuf>,
    /// Verbose engine diagnostics
    pub debug: Option<bool>,
    /// Always feed the master playlist to the engine
    pub disable_variant_selection: Option<bool>,
    /// Bitrate for forced AAC re-encoding
    pub aac_bitrate: Option<String>,
    /// Output muxer queue limit
    pub muxing_queue_size: Option<u32>,
    /// Engine stderr lines kept for error reports
    pub tail_lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Manifest request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Fallback user agent
    pub default_user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let planner = PlannerConfig::default();
        let fetch = FetchConfig::default();
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
                cors_enabled: Some(true),
            },
            engine: Some(EngineSettings {
                binary_path: None,
                debug: Some(planner.debug_logging),
                disable_variant_selection: Some(planner.disable_variant_selection),
                aac_bitrate: Some(planner.aac_bitrate),
                muxing_queue_size: Some(planner.muxing_queue_size),
                tail_lines: Some(20),
            }),
            fetch: Some(FetchSettings {
                timeout_secs: Some(fetch.timeout_secs),
                default_user_agent: Some(fetch.default_user_agent),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let engine = self.engine;
        let fetch = self.fetch;

        let planner = match &engine {
            Some(e) => PlannerConfig {
                engine_binary_path: e.binary_path.clone(),
                debug_logging: e.debug.unwrap_or(defaults.planner.debug_logging),
                disable_variant_selection: e
                    .disable_variant_selection
                    .unwrap_or(defaults.planner.disable_variant_selection),
                aac_bitrate: e
                    .aac_bitrate
                    .clone()
                    .unwrap_or_else(|| defaults.planner.aac_bitrate.clone()),
                muxing_queue_size: e
                    .muxing_queue_size
                    .unwrap_or(defaults.planner.muxing_queue_size),
            },
            None => defaults.planner.clone(),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            planner,
            fetch: FetchConfig {
                timeout_secs: fetch
                    .as_ref()
                    .and_then(|f| f.timeout_secs)
                    .unwrap_or(defaults.fetch.timeout_secs),
                default_user_agent: fetch
                    .and_then(|f| f.default_user_agent)
                    .unwrap_or(defaults.fetch.default_user_agent),
            },
            engine_tail_lines: engine
                .and_then(|e| e.tail_lines)
                .unwrap_or(defaults.engine_tail_lines),
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default_config();
        assert_eq!(config.server.port, 5000);
        let engine = config.engine.unwrap();
        assert_eq!(engine.muxing_queue_size, Some(2048));
        assert_eq!(engine.aac_bitrate.as_deref(), Some("160k"));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = ConfigFile::default_config();

        let mut temp_file = NamedTempFile::new().unwrap();
        let content = toml::to_string_pretty(&config).unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let loaded = ConfigFile::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.server.port, config.server.port);
        assert_eq!(
            loaded.fetch.unwrap().timeout_secs,
            config.fetch.unwrap().timeout_secs
        );
    }

    #[test]
    fn test_minimal_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                b"[server]\nhost = \"127.0.0.1\"\nport = 8000\n\n[engine]\nbinary_path = \"/usr/local/bin/ffmpeg\"\ndisable_variant_selection = true\n",
            )
            .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_server_config();
        assert_eq!(config.socket_addr(), "127.0.0.1:8000");
        assert_eq!(
            config.planner.engine_binary_path,
            Some(PathBuf::from("/usr/local/bin/ffmpeg"))
        );
        assert!(config.planner.disable_variant_selection);
        assert!(!config.planner.debug_logging);
        assert_eq!(config.planner.aac_bitrate, "160k");
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.engine_tail_lines, 20);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn test_generate_default_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        generate_default_config(&path).unwrap();

        assert!(path.exists());
        let loaded = ConfigFile::from_file(&path).unwrap().into_server_config();
        assert_eq!(loaded.port, 5000);
        assert_eq!(loaded.planner.muxing_queue_size, 2048);
    }
}
