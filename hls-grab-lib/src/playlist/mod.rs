//! HLS playlist analysis
//!
//! This module turns fetched playlist text into a [`PlaylistModel`]:
//! - Line tokenizer producing typed records (`tokenizer`)
//! - Single-pass reducer for master playlists (`master`)
//! - Master / media playlist classification

pub mod master;
pub mod tokenizer;

use serde::Serialize;
use url::Url;

pub use master::analyze;
use tokenizer::{tokenize, Line};

/// One `#EXT-X-STREAM-INF` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Declared peak bandwidth, 0 when absent
    pub bandwidth: u64,
    /// Absolute variant playlist URL
    pub uri: String,
}

/// One externally addressable `#EXT-X-MEDIA` rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaGroup {
    /// `LANGUAGE`, verbatim
    pub language: Option<String>,
    /// Absolute rendition playlist URL
    pub uri: String,
    pub group_id: Option<String>,
    pub name: Option<String>,
}

/// Parsed master playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistModel {
    /// URL the playlist was fetched from
    pub url: String,
    /// In source order, never empty
    pub variants: Vec<Variant>,
    pub audio_groups: Vec<MediaGroup>,
    pub subtitle_groups: Vec<MediaGroup>,
}

impl PlaylistModel {
    /// Variant with the highest bandwidth; the first one wins ties.
    pub fn best_variant(&self) -> Option<&Variant> {
        self.variants.iter().fold(None, |best: Option<&Variant>, v| match best {
            Some(b) if b.bandwidth >= v.bandwidth => Some(b),
            _ => Some(v),
        })
    }

    pub fn has_audio_groups(&self) -> bool {
        !self.audio_groups.is_empty()
    }

    pub fn has_subtitle_groups(&self) -> bool {
        !self.subtitle_groups.is_empty()
    }
}

/// What kind of playlist a text is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    /// Lists variants
    Master,
    /// Lists media segments
    Media,
    /// Neither
    Unknown,
}

/// Classify playlist text without building a model.
pub fn classify(text: &str) -> PlaylistKind {
    let mut header = false;
    let mut segments = false;
    for line in tokenize(text) {
        match line {
            Line::Header => header = true,
            Line::StreamInf(_) if header => return PlaylistKind::Master,
            Line::Segment => segments = true,
            _ => {}
        }
    }
    if header && segments {
        PlaylistKind::Media
    } else {
        PlaylistKind::Unknown
    }
}

/// Resolve a playlist entry against the playlist's own URL (RFC 3986).
pub(crate) fn resolve_entry(base: &Url, entry: &str) -> crate::error::Result<String> {
    base.join(entry).map(String::from).map_err(|e| {
        crate::error::GrabError::PlaylistParse(format!(
            "cannot resolve \"{}\" against {}: {}",
            entry, base, e
        ))
    })
}
