//! Manifest fetching over HTTP
//!
//! Blocking reqwest client. Build and use it on a blocking thread
//! (`spawn_blocking`), never on the async executor.

use std::time::Duration;

use hls_grab_lib::{GrabError, ManifestFetch, RequestHeaders, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use url::Url;

use crate::config::FetchConfig;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GrabError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Header map for the fetch. Pairs that are not valid HTTP headers are
/// skipped; the engine still receives them verbatim.
pub fn header_map(headers: &RequestHeaders) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers.fetch_pairs() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {:?} for manifest fetch", name),
        }
    }
    map
}

/// Error for a non-2xx answer. CDN token failures often use codes without
/// a reason phrase, so the code itself is always kept.
pub fn status_error(url: &Url, status: StatusCode) -> GrabError {
    GrabError::ManifestFetch {
        url: url.to_string(),
        status: Some(status.as_u16()),
        reason: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    }
}

impl ManifestFetch for HttpFetcher {
    fn fetch(&self, url: &Url, headers: &RequestHeaders) -> Result<String> {
        tracing::debug!("Fetching manifest {}", url);
        let fetch_error = |status: Option<u16>, reason: String| GrabError::ManifestFetch {
            url: url.to_string(),
            status,
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .headers(header_map(headers))
            .send()
            .map_err(|e| fetch_error(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        response
            .text()
            .map_err(|e| fetch_error(Some(status.as_u16()), e.to_string()))
    }
}
