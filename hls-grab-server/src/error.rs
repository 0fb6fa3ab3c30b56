//! Server-specific error types

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hls_grab_lib::{ErrorKind, GrabError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Library(#[from] GrabError),

    #[error("Invalid form: {0}")]
    Form(#[from] FormRejection),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Machine readable kind for the JSON body
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::Library(e) => e.kind().as_str(),
            ServerError::Form(_) => "invalid_form",
            ServerError::Config(_) => "config_error",
            ServerError::Internal(_) => "internal_error",
            ServerError::Io(_) => "io_error",
        }
    }

    /// Status the CDN answered with, for failed manifest fetches
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ServerError::Library(GrabError::ManifestFetch { status, .. }) => *status,
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Library(e) => match e.kind() {
                ErrorKind::InvalidDescriptor
                | ErrorKind::ManifestMissing
                | ErrorKind::NoCdnCandidate => StatusCode::BAD_REQUEST,
                ErrorKind::ManifestFetch | ErrorKind::PlaylistParse => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Form(rejection) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(upstream) = self.upstream_status() {
            body["upstream_status"] = upstream.into();
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GrabError::InvalidDescriptor("drm".into()), StatusCode::BAD_REQUEST),
            (GrabError::ManifestMissing, StatusCode::BAD_REQUEST),
            (GrabError::NoCdnCandidate("x".into()), StatusCode::BAD_REQUEST),
            (
                GrabError::ManifestFetch {
                    url: "u".into(),
                    status: Some(403),
                    reason: "Forbidden".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (GrabError::PlaylistParse("p".into()), StatusCode::BAD_GATEWAY),
            (
                GrabError::EngineExecution {
                    status: "exit status: 1".into(),
                    tail: "boom".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
        assert_eq!(
            ServerError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = ServerError::from(GrabError::ManifestMissing).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "manifest_missing");
        assert!(json["message"].as_str().unwrap().contains("Manifest URI missing"));
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_upstream_status() {
        let err = ServerError::from(GrabError::ManifestFetch {
            url: "https://cdn/m.m3u8".into(),
            status: Some(498),
            reason: "unexpected status".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "manifest_fetch_error");
        assert_eq!(json["upstream_status"], 498);
        assert!(json["message"].as_str().unwrap().contains("HTTP 498"));
    }
}
