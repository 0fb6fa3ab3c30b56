//! Planner configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default AAC bitrate used when audio is re-encoded
pub const DEFAULT_AAC_BITRATE: &str = "160k";

/// Default value for the engine's `-max_muxing_queue_size`
pub const DEFAULT_MUXING_QUEUE_SIZE: u32 = 2048;

/// Configuration handed to [`crate::Planner::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Explicit engine binary. Overrides discovery on `PATH`.
    pub engine_binary_path: Option<PathBuf>,

    /// Ask the engine for verbose diagnostics (`-loglevel debug -report`)
    pub debug_logging: bool,

    /// Never pick a single variant; always feed the master playlist
    pub disable_variant_selection: bool,

    /// Bitrate for forced AAC re-encoding
    pub aac_bitrate: String,

    /// Packet queue limit for the output muxer
    pub muxing_queue_size: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            engine_binary_path: None,
            debug_logging: false,
            disable_variant_selection: false,
            aac_bitrate: DEFAULT_AAC_BITRATE.to_string(),
            muxing_queue_size: DEFAULT_MUXING_QUEUE_SIZE,
        }
    }
}
