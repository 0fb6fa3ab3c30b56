//! Stream selection
//!
//! Decides which URL the engine reads and which of its streams end up in the
//! output. The decision is engine-agnostic: map directives are tagged values,
//! rendered into engine syntax by the plan builder.

pub mod policy;

pub use policy::{select, select_passthrough};

use serde::Serialize;

use crate::preferences::Container;

/// Elementary stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

/// Which streams of a kind a directive selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapTarget {
    /// The first stream; the remux fails without it
    Required,
    /// Streams tagged with this language, if any
    OptionalExact(String),
    /// The first stream, if any
    OptionalDefault,
    /// Every stream, if any
    OptionalAll,
}

/// One stream-map instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapDirective {
    pub kind: StreamKind,
    pub target: MapTarget,
}

impl MapDirective {
    pub fn new(kind: StreamKind, target: MapTarget) -> Self {
        Self { kind, target }
    }

    pub fn is_optional(&self) -> bool {
        self.target != MapTarget::Required
    }
}

/// Subtitle encoding in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleCodec {
    Copy,
    MovText,
}

impl SubtitleCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleCodec::Copy => "copy",
            SubtitleCodec::MovText => "mov_text",
        }
    }
}

/// What the engine input is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputChoice {
    /// The master playlist, so external media groups stay addressable
    Master,
    /// A single variant playlist
    Variant { bandwidth: u64 },
    /// A manifest that was not analyzed (DASH, or an HLS media playlist)
    Passthrough,
}

/// Output of the selection policy, consumed once by the plan builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionDecision {
    pub input_url: String,
    pub input: InputChoice,
    pub video_map: MapDirective,
    pub audio_maps: Vec<MapDirective>,
    pub subtitle_maps: Vec<MapDirective>,
    pub force_aac: bool,
    pub subtitle_codec: SubtitleCodec,
    pub container: Container,
    /// Copied audio needs the ADTS to ASC bitstream filter (HLS sources)
    pub adts_to_asc: bool,
}
