//! Remux plan builder
//!
//! Renders a [`SelectionDecision`] into the ordered argument list of an
//! ffmpeg-compatible engine. The plan is inert: executing it is up to the
//! caller. Output options always come before the output path, which is the
//! last token.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::PlannerConfig;
use crate::headers::{mask_value, RequestHeaders};
use crate::preferences::Container;
use crate::selection::{MapDirective, MapTarget, SelectionDecision, StreamKind};

/// Protocols the engine may open while reading the input
const PROTOCOL_WHITELIST: &str = "file,http,https,tcp,tls,crypto,concat";

/// Ordered engine argument list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemuxPlan {
    args: Vec<String>,
    output: PathBuf,
}

impl RemuxPlan {
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Display form safe for logs: cookie values are masked.
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

/// See [`RemuxPlan::redacted`].
pub struct Redacted<'a>(&'a RemuxPlan);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut after_headers = false;
        for (idx, arg) in self.0.args.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            let shown = if after_headers {
                redact_header_block(arg)
            } else {
                arg.clone()
            };
            if shown.is_empty() || shown.contains(char::is_whitespace) {
                write!(f, "\"{}\"", shown)?;
            } else {
                f.write_str(&shown)?;
            }
            after_headers = arg == "-headers";
        }
        Ok(())
    }
}

fn redact_header_block(block: &str) -> String {
    block
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("cookie") => {
                format!("{}: {}", key, mask_value(value.trim()))
            }
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\\r\\n")
}

/// Builds [`RemuxPlan`]s with the engine settings of a [`PlannerConfig`].
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    debug_logging: bool,
    aac_bitrate: String,
    muxing_queue_size: u32,
}

impl PlanBuilder {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            debug_logging: config.debug_logging,
            aac_bitrate: config.aac_bitrate.clone(),
            muxing_queue_size: config.muxing_queue_size,
        }
    }

    pub fn build(
        &self,
        decision: &SelectionDecision,
        headers: &RequestHeaders,
        output: &Path,
    ) -> RemuxPlan {
        let mut args: Vec<String> = Vec::new();
        let mut push = |items: &[&str]| args.extend(items.iter().map(|s| s.to_string()));

        // logging
        if self.debug_logging {
            push(&["-loglevel", "debug", "-report"]);
        } else {
            push(&["-loglevel", "warning", "-stats"]);
        }

        // global and input protocol options
        push(&["-y", "-nostdin", "-protocol_whitelist", PROTOCOL_WHITELIST]);
        push(&[
            "-reconnect",
            "1",
            "-reconnect_streamed",
            "1",
            "-reconnect_at_eof",
            "1",
            "-reconnect_delay_max",
            "2",
        ]);
        push(&["-user_agent", &headers.user_agent]);
        if let Some(block) = headers.engine_header_arg() {
            push(&["-headers", &block]);
        }

        push(&["-i", &decision.input_url]);

        // maps
        push(&["-map", &map_spec(&decision.video_map)]);
        for directive in &decision.audio_maps {
            push(&["-map", &map_spec(directive)]);
        }
        if decision.subtitle_maps.is_empty() {
            push(&["-sn"]);
        } else {
            for directive in &decision.subtitle_maps {
                push(&["-map", &map_spec(directive)]);
            }
        }

        // codecs
        push(&["-c:v", "copy"]);
        if decision.force_aac {
            push(&["-c:a", "aac", "-b:a", &self.aac_bitrate]);
        } else {
            push(&["-c:a", "copy"]);
            if decision.adts_to_asc {
                push(&["-bsf:a", "aac_adtstoasc"]);
            }
        }
        if !decision.subtitle_maps.is_empty() {
            push(&["-c:s", decision.subtitle_codec.as_str()]);
        }

        if decision.container == Container::Mp4 {
            push(&["-movflags", "+faststart"]);
        }

        push(&["-max_muxing_queue_size", &self.muxing_queue_size.to_string()]);

        args.push(output.to_string_lossy().into_owned());

        RemuxPlan {
            args,
            output: output.to_path_buf(),
        }
    }
}

/// Engine stream specifier for one directive, all on input 0.
fn map_spec(directive: &MapDirective) -> String {
    let kind = match directive.kind {
        StreamKind::Video => "v",
        StreamKind::Audio => "a",
        StreamKind::Subtitle => "s",
    };
    match &directive.target {
        MapTarget::Required => format!("0:{}:0", kind),
        MapTarget::OptionalExact(lang) => format!("0:{}:m:language:{}?", kind, lang),
        MapTarget::OptionalDefault => format!("0:{}:0?", kind),
        MapTarget::OptionalAll => format!("0:{}?", kind),
    }
}
