use thiserror::Error;

/// Main error type for the planner core
#[derive(Error, Debug)]
pub enum GrabError {
    /// The descriptor JSON is malformed, incomplete or DRM protected
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// The descriptor carries no manifest location
    #[error("Manifest URI missing in descriptor")]
    ManifestMissing,

    /// The manifest URI is relative and no CDN base can complete it
    #[error("No CDN candidate to resolve relative manifest URI: {0}")]
    NoCdnCandidate(String),

    /// The manifest could not be fetched
    #[error("Failed to fetch manifest {url} ({}): {reason}", fetch_status(.status))]
    ManifestFetch {
        url: String,
        /// HTTP status when the server answered, None for transport failures
        status: Option<u16>,
        reason: String,
    },

    /// The manifest text is not a usable HLS playlist
    #[error("Playlist parse error: {0}")]
    PlaylistParse(String),

    /// The transcoding engine failed
    #[error("Engine failed ({status}):\n{tail}")]
    EngineExecution {
        /// Exit status description
        status: String,
        /// Last lines of the engine's diagnostic output
        tail: String,
    },

    /// Planner or engine configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable, machine readable error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDescriptor,
    ManifestMissing,
    NoCdnCandidate,
    ManifestFetch,
    PlaylistParse,
    EngineExecution,
    Config,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidDescriptor => "invalid_descriptor",
            ErrorKind::ManifestMissing => "manifest_missing",
            ErrorKind::NoCdnCandidate => "no_cdn_candidate",
            ErrorKind::ManifestFetch => "manifest_fetch_error",
            ErrorKind::PlaylistParse => "playlist_parse_error",
            ErrorKind::EngineExecution => "engine_execution_error",
            ErrorKind::Config => "config_error",
            ErrorKind::Io => "io_error",
        }
    }

    /// Whether the caller can fix the problem by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidDescriptor | ErrorKind::ManifestMissing | ErrorKind::NoCdnCandidate
        )
    }
}

impl GrabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrabError::InvalidDescriptor(_) => ErrorKind::InvalidDescriptor,
            GrabError::ManifestMissing => ErrorKind::ManifestMissing,
            GrabError::NoCdnCandidate(_) => ErrorKind::NoCdnCandidate,
            GrabError::ManifestFetch { .. } => ErrorKind::ManifestFetch,
            GrabError::PlaylistParse(_) => ErrorKind::PlaylistParse,
            GrabError::EngineExecution { .. } => ErrorKind::EngineExecution,
            GrabError::Config(_) => ErrorKind::Config,
            GrabError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<serde_json::Error> for GrabError {
    fn from(err: serde_json::Error) -> Self {
        GrabError::InvalidDescriptor(format!("invalid JSON: {}", err))
    }
}

fn fetch_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_string(),
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GrabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(GrabError::ManifestMissing.kind(), ErrorKind::ManifestMissing);
        assert_eq!(
            GrabError::PlaylistParse("x".into()).kind().as_str(),
            "playlist_parse_error"
        );
        assert!(GrabError::NoCdnCandidate("a".into()).kind().is_user_error());
        assert!(!GrabError::Config("a".into()).kind().is_user_error());
    }

    #[test]
    fn test_manifest_fetch_message_has_status() {
        let err = GrabError::ManifestFetch {
            url: "https://cdn/m.m3u8".into(),
            status: Some(498),
            reason: "unexpected status".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch manifest https://cdn/m.m3u8 (HTTP 498): unexpected status"
        );

        let err = GrabError::ManifestFetch {
            url: "https://cdn/m.m3u8".into(),
            status: None,
            reason: "connection refused".into(),
        };
        assert!(err.to_string().contains("(no response): connection refused"));
    }

    #[test]
    fn test_json_error_is_invalid_descriptor() {
        let err: GrabError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);
    }
}
