use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::FormRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;

use crate::engine::{probe_version, EngineRunner};
use crate::error::{Result, ServerError};
use crate::fetch::HttpFetcher;
use crate::state::AppState;

use super::form::DownloadForm;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Form page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Engine path and version
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let Some(engine) = state.engine.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "ffmpeg": null, "version": null })),
        )
            .into_response();
    };

    match probe_version(engine).await {
        Ok(version) => Json(serde_json::json!({
            "ffmpeg": engine.display().to_string(),
            "version": version,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "ffmpeg": engine.display().to_string(),
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}

/// Plan, run the engine, stream the result as an attachment
pub async fn download(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<DownloadForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let job_id = uuid::Uuid::new_v4();
    tracing::info!("[{}] download requested", job_id);

    let engine = state.engine.clone().ok_or_else(|| {
        ServerError::Config("ffmpeg not found. Install it or add to PATH.".to_string())
    })?;

    let request = form.into_plan_request(&state.config)?;
    if let Some(cookie) = &request.headers.cookie {
        tracing::debug!(
            "[{}] cookie {}",
            job_id,
            hls_grab_lib::headers::mask_value(cookie)
        );
    }

    // Removed when the response body (or this future, on error) is dropped.
    let workdir = tempfile::Builder::new().prefix("hls_grab_").tempdir()?;

    let planning_state = Arc::clone(&state);
    let output_dir = workdir.path().to_path_buf();
    let job = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&planning_state.config.fetch)?;
        planning_state.planner.plan(&request, &fetcher, &output_dir)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("planner task failed: {}", e)))??;

    tracing::info!(
        "[{}] input {} -> {}",
        job_id,
        job.decision.input_url,
        job.file_name
    );
    tracing::debug!("[{}] {} {}", job_id, engine.display(), job.plan.redacted());

    EngineRunner::new(engine, state.config.engine_tail_lines)
        .run(job.plan.args(), job.output_path())
        .await?;

    let file = tokio::fs::File::open(job.output_path()).await?;
    let length = file.metadata().await?.len();
    tracing::info!("[{}] sending {} ({} bytes)", job_id, job.file_name, length);

    let stream = ReaderStream::new(file).map(move |chunk: std::io::Result<Bytes>| {
        let _workdir = &workdir;
        chunk
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, job.decision.container.mime_type())
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, content_disposition(&job.file_name))
        .body(Body::from_stream(stream))
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(response)
}

/// `attachment` disposition; characters a quoted header value cannot carry
/// become `_`.
fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
