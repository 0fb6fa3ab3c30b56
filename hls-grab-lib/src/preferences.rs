//! User track preferences

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which audio tracks to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// First audio stream only
    #[default]
    Default,
    /// Listed languages, then the first stream as fallback
    Prefer,
    /// Every audio stream
    All,
}

/// Which subtitle tracks to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleMode {
    #[default]
    None,
    Prefer,
    All,
}

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Mp4,
    Mkv,
}

impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Container::Mp4 => "video/mp4",
            Container::Mkv => "video/x-matroska",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error for mode/container strings that name nothing known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption(pub String);

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown option \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownOption {}

impl FromStr for AudioMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(AudioMode::Default),
            "prefer" => Ok(AudioMode::Prefer),
            "all" => Ok(AudioMode::All),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

impl FromStr for SubtitleMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SubtitleMode::None),
            "prefer" => Ok(SubtitleMode::Prefer),
            "all" => Ok(SubtitleMode::All),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

impl FromStr for Container {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Container::Mp4),
            "mkv" => Ok(Container::Mkv),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// Everything the selection policy needs to know about the user's wishes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub audio_mode: AudioMode,
    /// Ordered, most wanted first
    pub audio_languages: Vec<String>,
    pub subtitle_mode: SubtitleMode,
    pub subtitle_languages: Vec<String>,
    pub force_aac: bool,
    pub container: Container,
    pub disable_variant_selection: bool,
}

/// Split a comma separated language list.
///
/// Entries are trimmed and lower-cased; empty entries and repeats are dropped,
/// keeping first-seen order.
pub fn parse_languages(list: &str) -> Vec<String> {
    let mut langs: Vec<String> = Vec::new();
    for lang in list.split(',').map(|l| l.trim().to_lowercase()) {
        if !lang.is_empty() && !langs.contains(&lang) {
            langs.push(lang);
        }
    }
    langs
}
