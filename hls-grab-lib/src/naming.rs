//! Output file naming

use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorMetadata;
use crate::preferences::Container;

/// Series label used when neither the form nor the descriptor has one
pub const DEFAULT_LABEL: &str = "video";

/// Naming fields typed by the user. Blank fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOverrides {
    /// Complete file name, wins over everything else
    pub output: String,
    pub series: String,
    pub season: String,
    pub episode: String,
    pub title: String,
}

/// Everything that goes into the output file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputNamingContext {
    pub series: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub title: Option<String>,
    pub manual_override: Option<String>,
    pub container: Container,
}

impl OutputNamingContext {
    /// Merge form overrides over descriptor metadata, field by field.
    pub fn new(
        overrides: &NamingOverrides,
        metadata: &DescriptorMetadata,
        container: Container,
    ) -> Self {
        Self {
            series: non_empty(&overrides.series).or_else(|| metadata.series.clone()),
            season: number(&overrides.season).or(metadata.season),
            episode: number(&overrides.episode).or(metadata.episode),
            title: non_empty(&overrides.title).or_else(|| metadata.title.clone()),
            manual_override: non_empty(&overrides.output),
            container,
        }
    }

    /// The output file name, never empty and without path separators.
    pub fn derive(&self) -> String {
        let ext = self.container.extension();

        if let Some(manual) = &self.manual_override {
            let name = manual.replace(['/', '\\'], "-");
            let suffix = format!(".{}", ext);
            if name.to_ascii_lowercase().ends_with(&suffix) {
                return name;
            }
            return format!("{}{}", name, suffix);
        }

        let mut name = self
            .series
            .as_deref()
            .map(slug)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string());
        if let Some(season) = self.season {
            name.push_str(&format!("-t{}", season));
        }
        if let Some(episode) = self.episode {
            name.push_str(&format!("-e-{}", episode));
        }
        if let Some(title) = self.title.as_deref().map(slug).filter(|t| !t.is_empty()) {
            name.push('-');
            name.push_str(&title);
        }
        format!("{}.{}", name, ext)
    }
}

/// Filesystem-safe name segment.
///
/// Path separators become spaces, characters outside `[A-Za-z0-9 ._-]` are
/// dropped, whitespace runs collapse and the remaining spaces become `-`.
pub fn slug(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '-' | '_'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

fn non_empty(s: &str) -> Option<String> {
    match s.trim() {
        "" => None,
        s => Some(s.to_string()),
    }
}

/// Any integer, sign included, as long as it fits in an `i64`.
fn number(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!("ignoring non-numeric naming field \"{}\"", s);
            None
        }
    }
}
