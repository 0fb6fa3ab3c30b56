//! Selection policy - input choice and map directives

use super::{
    InputChoice, MapDirective, MapTarget, SelectionDecision, StreamKind, SubtitleCodec,
};
use crate::descriptor::PackageType;
use crate::playlist::PlaylistModel;
use crate::preferences::{AudioMode, Container, Preferences, SubtitleMode};

/// Decide input and stream maps for an analyzed master playlist.
///
/// Input, first match wins:
/// 1. wanted subtitles with subtitle groups present, or non-default audio
///    with audio groups present: the master (groups only exist there)
/// 2. variant selection disabled: the master
/// 3. otherwise the highest-bandwidth variant, first of equals
pub fn select(playlist: &PlaylistModel, prefs: &Preferences) -> SelectionDecision {
    let wants_subtitle_groups =
        prefs.subtitle_mode != SubtitleMode::None && playlist.has_subtitle_groups();
    let wants_audio_groups = prefs.audio_mode != AudioMode::Default && playlist.has_audio_groups();

    let (input_url, input) = if wants_subtitle_groups || wants_audio_groups {
        tracing::debug!("using master playlist as input: media groups requested");
        (playlist.url.clone(), InputChoice::Master)
    } else if prefs.disable_variant_selection {
        tracing::debug!("using master playlist as input: variant selection disabled");
        (playlist.url.clone(), InputChoice::Master)
    } else {
        match playlist.best_variant() {
            Some(best) => {
                tracing::debug!("media playlist chosen: {} ({} bps)", best.uri, best.bandwidth);
                (
                    best.uri.clone(),
                    InputChoice::Variant {
                        bandwidth: best.bandwidth,
                    },
                )
            }
            None => (playlist.url.clone(), InputChoice::Master),
        }
    };

    decide(input_url, input, prefs, true)
}

/// Decision for a manifest fed to the engine as-is.
pub fn select_passthrough(
    manifest_url: &str,
    prefs: &Preferences,
    package: PackageType,
) -> SelectionDecision {
    decide(
        manifest_url.to_string(),
        InputChoice::Passthrough,
        prefs,
        package == PackageType::Hls,
    )
}

fn decide(
    input_url: String,
    input: InputChoice,
    prefs: &Preferences,
    adts_to_asc: bool,
) -> SelectionDecision {
    let audio_maps = match prefs.audio_mode {
        AudioMode::Default => track_maps(StreamKind::Audio, Selection::Default),
        AudioMode::Prefer => track_maps(StreamKind::Audio, Selection::Prefer(&prefs.audio_languages)),
        AudioMode::All => track_maps(StreamKind::Audio, Selection::All),
    };
    let subtitle_maps = match prefs.subtitle_mode {
        SubtitleMode::None => Vec::new(),
        SubtitleMode::Prefer => track_maps(
            StreamKind::Subtitle,
            Selection::Prefer(&prefs.subtitle_languages),
        ),
        SubtitleMode::All => track_maps(StreamKind::Subtitle, Selection::All),
    };

    let subtitle_codec = if prefs.container == Container::Mp4 && !subtitle_maps.is_empty() {
        SubtitleCodec::MovText
    } else {
        SubtitleCodec::Copy
    };

    SelectionDecision {
        input_url,
        input,
        video_map: MapDirective::new(StreamKind::Video, MapTarget::Required),
        audio_maps,
        subtitle_maps,
        force_aac: prefs.force_aac,
        subtitle_codec,
        container: prefs.container,
        adts_to_asc,
    }
}

enum Selection<'a> {
    Default,
    Prefer(&'a [String]),
    All,
}

fn track_maps(kind: StreamKind, selection: Selection) -> Vec<MapDirective> {
    match selection {
        Selection::Default => vec![MapDirective::new(kind, MapTarget::OptionalDefault)],
        Selection::All => vec![MapDirective::new(kind, MapTarget::OptionalAll)],
        Selection::Prefer(languages) => languages
            .iter()
            .map(|lang| MapDirective::new(kind, MapTarget::OptionalExact(lang.clone())))
            // Fallback last, so an unmatched language list still yields a track.
            .chain(std::iter::once(MapDirective::new(kind, MapTarget::OptionalDefault)))
            .collect(),
    }
}
