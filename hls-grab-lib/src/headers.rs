//! Caller-supplied HTTP identity
//!
//! The same headers go to the manifest fetch and, as the engine's `-headers`
//! option, to every segment request the engine makes.

use serde::{Deserialize, Serialize};

/// User agent used when the caller supplies none
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub referer: Option<String>,
    pub origin: Option<String>,
    pub cookie: Option<String>,
    /// Extra `Key: Value` pairs, in caller order
    pub extra: Vec<(String, String)>,
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
            origin: None,
            cookie: None,
            extra: Vec::new(),
        }
    }
}

impl RequestHeaders {
    /// Build from raw form values. Blank values count as absent.
    pub fn from_fields(
        user_agent: &str,
        referer: &str,
        origin: &str,
        cookie: &str,
        extra_lines: &str,
    ) -> Self {
        let user_agent = match user_agent.trim() {
            "" => DEFAULT_USER_AGENT.to_string(),
            ua => ua.to_string(),
        };
        Self {
            user_agent,
            referer: non_empty(referer),
            origin: non_empty(origin),
            cookie: non_empty(cookie),
            extra: parse_extra_lines(extra_lines),
        }
    }

    /// Header lines without the user agent and cookie, in engine order.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(referer) = &self.referer {
            lines.push(format!("Referer: {}", referer));
        }
        if let Some(origin) = &self.origin {
            lines.push(format!("Origin: {}", origin));
        }
        for (key, value) in &self.extra {
            lines.push(format!("{}: {}", key, value));
        }
        lines
    }

    /// Value for the engine's `-headers` option.
    ///
    /// CRLF-joined and CRLF-terminated, cookie last. None when there is
    /// nothing to send.
    pub fn engine_header_arg(&self) -> Option<String> {
        let mut lines = self.header_lines();
        if let Some(cookie) = &self.cookie {
            lines.push(format!("Cookie: {}", cookie));
        }
        if lines.is_empty() {
            return None;
        }
        let mut arg = lines.join("\r\n");
        arg.push_str("\r\n");
        Some(arg)
    }

    /// Name/value pairs for an HTTP client, user agent first.
    ///
    /// A later extra header with the same name replaces an earlier pair.
    pub fn fetch_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            vec![("User-Agent".to_string(), self.user_agent.clone())];
        let mut set = |key: &str, value: &str| {
            match pairs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(pair) => pair.1 = value.to_string(),
                None => pairs.push((key.to_string(), value.to_string())),
            }
        };
        if let Some(referer) = &self.referer {
            set("Referer", referer);
        }
        if let Some(origin) = &self.origin {
            set("Origin", origin);
        }
        for (key, value) in &self.extra {
            set(key, value);
        }
        if let Some(cookie) = &self.cookie {
            set("Cookie", cookie);
        }
        pairs
    }
}

/// Parse one `Key: Value` header per line; lines without a colon or with an
/// empty key are dropped.
pub fn parse_extra_lines(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Mask a secret for log output.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn non_empty(s: &str) -> Option<String> {
    match s.trim() {
        "" => None,
        s => Some(s.to_string()),
    }
}
