//! Tagged-line tokenizer for HLS playlists
//!
//! Every line of a playlist becomes one typed [`Line`] record. Only the tags
//! the analyzer cares about get their own variant; everything else is `Other`.

/// Compile a regex literal once.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Attribute list of a tag line, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Parse `KEY=VALUE,KEY="quoted,value",...`.
    ///
    /// Quoted values keep their commas and lose their quotes. Keys are
    /// matched case-sensitively, as HLS attribute names are upper-case.
    pub fn parse(list: &str) -> Self {
        let re = regex!(r#"([A-Z0-9-]+)=("[^"]*"|[^,]*)"#);
        let attrs = re
            .captures_iter(list)
            .map(|caps| {
                let value = caps[2].trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                (caps[1].to_string(), value.to_string())
            })
            .collect();
        Attributes(attrs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One classified playlist line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `#EXTM3U`
    Header,
    /// `#EXT-X-STREAM-INF:<attributes>`
    StreamInf(Attributes),
    /// `#EXT-X-MEDIA:<attributes>`
    Media(Attributes),
    /// `#EXTINF` or `#EXT-X-TARGETDURATION`, only found in media playlists
    Segment,
    /// A non-comment, non-blank line
    Uri(String),
    /// Any other tag, comment or blank line
    Other,
}

fn classify(line: &str) -> Line {
    let line = line.trim();
    if line.is_empty() {
        return Line::Other;
    }
    if !line.starts_with('#') {
        return Line::Uri(line.to_string());
    }
    if line == "#EXTM3U" {
        return Line::Header;
    }
    if let Some(attrs) = line.strip_prefix("#EXT-X-STREAM-INF:") {
        return Line::StreamInf(Attributes::parse(attrs));
    }
    if let Some(attrs) = line.strip_prefix("#EXT-X-MEDIA:") {
        return Line::Media(Attributes::parse(attrs));
    }
    if line.starts_with("#EXTINF:") || line.starts_with("#EXT-X-TARGETDURATION:") {
        return Line::Segment;
    }
    Line::Other
}

/// Tokenize playlist text. Accepts a UTF-8 BOM and CRLF line endings.
pub fn tokenize(text: &str) -> impl Iterator<Item = Line> + '_ {
    text.trim_start_matches('\u{feff}').lines().map(classify)
}
