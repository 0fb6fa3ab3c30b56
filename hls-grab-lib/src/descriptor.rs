//! Asset descriptor
//!
//! Parses the JSON envelope produced by the player's session-preparation API:
//!
//! ```json
//! { "result": ..., "response": { "drm_type": "none", "package_type": "hls",
//!   "manifest_uri": "...", "cdns": { "cdn": [ { "priority": 0, "base_uri": "..." } ] } } }
//! ```
//!
//! Besides the fields needed to locate the manifest, the `response` object is
//! searched for series/episode metadata used to name the output file.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{GrabError, Result};

/// Streaming package format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    Hls,
    Dash,
}

impl FromStr for PackageType {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hls" => Ok(PackageType::Hls),
            "dash" => Ok(PackageType::Dash),
            other => Err(GrabError::InvalidDescriptor(format!(
                "unsupported package_type \"{}\"",
                other
            ))),
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PackageType::Hls => write!(f, "hls"),
            PackageType::Dash => write!(f, "dash"),
        }
    }
}

/// One CDN base the manifest may be served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnCandidate {
    pub priority: i64,
    pub base_uri: String,
}

/// Naming hints found in the descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorMetadata {
    pub series: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub title: Option<String>,
}

/// Parsed descriptor. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    /// Lower-cased DRM marker; anything but "none" is refused by the locator
    pub drm_type: String,
    pub package_type: PackageType,
    pub manifest_uri: String,
    /// In source order
    pub cdn_candidates: Vec<CdnCandidate>,
    pub metadata: DescriptorMetadata,
}

#[derive(Deserialize)]
struct RawEnvelope {
    result: Option<Value>,
    response: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawCdn {
    priority: Option<Value>,
    base_uri: Option<String>,
}

impl AssetDescriptor {
    /// Parse a descriptor from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let envelope: RawEnvelope = serde_json::from_str(text.trim())?;
        if envelope.result.is_none() {
            return Err(GrabError::InvalidDescriptor("missing \"result\"".to_string()));
        }
        let response = envelope
            .response
            .ok_or_else(|| GrabError::InvalidDescriptor("missing \"response\" object".to_string()))?;
        Self::from_response(&response)
    }

    fn from_response(resp: &Map<String, Value>) -> Result<Self> {
        let drm_type = required_str(resp, "drm_type")?.to_ascii_lowercase();
        let package_type: PackageType = required_str(resp, "package_type")?.parse()?;
        let manifest_uri = resp
            .get("manifest_uri")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        let cdn_candidates = match resp.get("cdns").and_then(|c| c.get("cdn")) {
            Some(list) => parse_cdns(list)?,
            None => Vec::new(),
        };

        Ok(AssetDescriptor {
            drm_type,
            package_type,
            manifest_uri,
            cdn_candidates,
            metadata: infer_metadata(resp),
        })
    }
}

fn required_str<'a>(resp: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    match resp.get(key) {
        Some(Value::String(s)) => Ok(s.trim()),
        Some(_) => Err(GrabError::InvalidDescriptor(format!(
            "\"response.{}\" must be a string",
            key
        ))),
        None => Err(GrabError::InvalidDescriptor(format!(
            "missing \"response.{}\"",
            key
        ))),
    }
}

fn parse_cdns(list: &Value) -> Result<Vec<CdnCandidate>> {
    let raw: Vec<RawCdn> = serde_json::from_value(list.clone()).map_err(|e| {
        GrabError::InvalidDescriptor(format!("malformed \"response.cdns.cdn\": {}", e))
    })?;

    let mut candidates = Vec::with_capacity(raw.len());
    for cdn in raw {
        let base_uri = cdn.base_uri.unwrap_or_default().trim().to_string();
        if base_uri.is_empty() {
            continue;
        }
        let priority = match cdn.priority {
            None | Some(Value::Null) => 0,
            Some(v) => as_integer(&v).ok_or_else(|| {
                GrabError::InvalidDescriptor(format!("CDN priority {} is not an integer", v))
            })?,
        };
        candidates.push(CdnCandidate { priority, base_uri });
    }
    Ok(candidates)
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

const SERIES_KEYS: &[&str] = &[
    "series",
    "series_title",
    "seriesTitle",
    "show",
    "program",
    "program_title",
    "asset_series",
    "collection",
    "collection_title",
];
const SERIES_PATHS: &[(&str, &str)] = &[
    ("program", "seriesTitle"),
    ("metadata", "seriesTitle"),
    ("meta", "series"),
];
const TITLE_KEYS: &[&str] = &[
    "title",
    "name",
    "episode",
    "episode_title",
    "episodeTitle",
    "asset_title",
];
const TITLE_PATHS: &[(&str, &str)] = &[
    ("program", "title"),
    ("metadata", "title"),
    ("meta", "title"),
];
const SEASON_KEYS: &[&str] = &["season", "season_number", "seasonNumber", "seasonNum"];
const EPISODE_KEYS: &[&str] = &["episode", "episode_number", "episodeNumber", "ep"];

/// Best-effort series/season/episode/title lookup in the `response` object
pub fn infer_metadata(resp: &Map<String, Value>) -> DescriptorMetadata {
    let first_string = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| resp.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };
    let nested_string = |paths: &[(&str, &str)]| {
        paths
            .iter()
            .filter_map(|(outer, inner)| resp.get(*outer)?.get(*inner)?.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };
    let first_number = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| resp.get(*k))
            .find_map(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                    s.parse().ok()
                }
                _ => None,
            })
    };

    DescriptorMetadata {
        series: first_string(SERIES_KEYS).or_else(|| nested_string(SERIES_PATHS)),
        season: first_number(SEASON_KEYS),
        episode: first_number(EPISODE_KEYS),
        title: first_string(TITLE_KEYS).or_else(|| nested_string(TITLE_PATHS)),
    }
}
