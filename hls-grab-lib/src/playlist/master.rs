//! Master playlist analyzer
//!
//! Reduces the tokenized lines of a master playlist into a [`PlaylistModel`]
//! in a single pass:
//! - `#EXT-X-STREAM-INF` + the next URI line -> one variant
//! - `#EXT-X-MEDIA:TYPE=AUDIO` with a `URI` -> one audio group
//! - `#EXT-X-MEDIA:TYPE=SUBTITLES` with a `URI` -> one subtitle group
//!
//! Closed-caption renditions have no URI and are not extracted; they never
//! show up as subtitle groups.

use url::Url;

use super::tokenizer::{tokenize, Attributes, Line};
use super::{resolve_entry, MediaGroup, PlaylistModel, Variant};
use crate::error::{GrabError, Result};

/// Parse master playlist text fetched from `url`.
pub fn analyze(text: &str, url: &Url) -> Result<PlaylistModel> {
    let mut saw_header = false;
    let mut pending_bandwidth: Option<u64> = None;
    let mut model = PlaylistModel {
        url: url.to_string(),
        variants: Vec::new(),
        audio_groups: Vec::new(),
        subtitle_groups: Vec::new(),
    };

    for line in tokenize(text) {
        match line {
            Line::Header => saw_header = true,
            Line::StreamInf(attrs) => {
                // A later STREAM-INF without URI in between replaces the earlier one.
                pending_bandwidth = Some(bandwidth(&attrs));
            }
            Line::Uri(entry) => {
                if let Some(bandwidth) = pending_bandwidth.take() {
                    model.variants.push(Variant {
                        bandwidth,
                        uri: resolve_entry(url, &entry)?,
                    });
                }
            }
            Line::Media(attrs) => {
                let group = match attrs.get("URI") {
                    Some(uri) => media_group(&attrs, resolve_entry(url, uri)?),
                    None => continue,
                };
                match attrs.get("TYPE") {
                    Some("AUDIO") => model.audio_groups.push(group),
                    Some("SUBTITLES") => model.subtitle_groups.push(group),
                    _ => {}
                }
            }
            Line::Segment | Line::Other => {}
        }
    }

    if !saw_header {
        return Err(GrabError::PlaylistParse(format!(
            "{} is not an HLS playlist (missing #EXTM3U)",
            url
        )));
    }
    if model.variants.is_empty() {
        return Err(GrabError::PlaylistParse(format!(
            "{} declares no #EXT-X-STREAM-INF variants",
            url
        )));
    }

    tracing::debug!(
        "analyzed {}: {} variants, {} audio groups, {} subtitle groups",
        url,
        model.variants.len(),
        model.audio_groups.len(),
        model.subtitle_groups.len()
    );
    Ok(model)
}

fn bandwidth(attrs: &Attributes) -> u64 {
    attrs
        .get("BANDWIDTH")
        .and_then(|b| b.parse().ok())
        .unwrap_or(0)
}

fn media_group(attrs: &Attributes, uri: String) -> MediaGroup {
    MediaGroup {
        language: attrs.get("LANGUAGE").map(str::to_string),
        uri,
        group_id: attrs.get("GROUP-ID").map(str::to_string),
        name: attrs.get("NAME").map(str::to_string),
    }
}
