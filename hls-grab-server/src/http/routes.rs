//! Axum router configuration

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{download, health_check, index};
use super::middleware::request_logger;

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route("/", get(index))
        .route("/download", post(download))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::path::PathBuf;
    use tower::util::ServiceExt;

    fn app(engine: Option<PathBuf>) -> Router {
        create_router(Arc::new(AppState::with_engine(
            ServerConfig::default(),
            engine,
        )))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_form(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/download")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn encoded(json: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("json_input", json)
            .finish()
    }

    #[tokio::test]
    async fn test_index_page() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("action=\"/download\""));
        assert!(html.contains("name=\"json_input\""));
    }

    #[tokio::test]
    async fn test_health_without_engine() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["ffmpeg"].is_null());
        assert!(json["version"].is_null());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_health_with_engine() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, "#!/bin/sh\necho 'ffmpeg version 9.9-test'\necho more\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(Some(fake.clone())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["ffmpeg"], fake.display().to_string());
        assert_eq!(json["version"], "ffmpeg version 9.9-test");
    }

    #[tokio::test]
    async fn test_download_without_engine() {
        let response = app(None)
            .oneshot(post_form(encoded("{}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "config_error");
    }

    #[tokio::test]
    async fn test_download_drm_is_bad_request() {
        let descriptor = serde_json::json!({
            "result": "ok",
            "response": {
                "drm_type": "widevine",
                "package_type": "dash",
                "manifest_uri": "https://cdn.example/a.mpd"
            }
        })
        .to_string();

        let response = app(Some(PathBuf::from("/bin/false")))
            .oneshot(post_form(encoded(&descriptor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "invalid_descriptor");
        assert!(json["message"].as_str().unwrap().contains("widevine"));
    }

    #[tokio::test]
    async fn test_download_bad_json_is_bad_request() {
        let response = app(Some(PathBuf::from("/bin/false")))
            .oneshot(post_form(encoded("not json")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_wrong_content_type_is_json_error() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/download")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("json_input={}"))
            .unwrap();

        let response = app(Some(PathBuf::from("/bin/false")))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(response).await["error"], "invalid_form");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_dash_streams_engine_output() {
        use std::os::unix::fs::PermissionsExt;

        // Fake engine: writes a marker into its last argument.
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(
            &fake,
            "#!/bin/sh\nfor last; do :; done\nprintf 'remuxed' > \"$last\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let descriptor = serde_json::json!({
            "result": "ok",
            "response": {
                "drm_type": "none",
                "package_type": "dash",
                "manifest_uri": "https://cdn.example/a.mpd",
                "series_title": "Foo",
                "season": 1,
                "episode": 2,
                "episode_title": "Pilot"
            }
        })
        .to_string();
        let body = format!("{}&container=mkv", encoded(&descriptor));

        let response = app(Some(fake)).oneshot(post_form(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/x-matroska"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"Foo-t1-e-2-Pilot.mkv\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"remuxed");
    }

    #[tokio::test]
    async fn test_cors_options() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/download")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
