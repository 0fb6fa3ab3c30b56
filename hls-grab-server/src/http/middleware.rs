//! HTTP middleware

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};

/// How a finished request is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx/3xx
    Ok,
    /// Bad descriptor or form; the caller can fix it
    Rejected,
    /// The CDN refused or garbled the manifest
    Upstream,
    /// Engine or server failure
    Failed,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::BAD_GATEWAY {
            Outcome::Upstream
        } else if status.is_client_error() {
            Outcome::Rejected
        } else if status.is_server_error() {
            Outcome::Failed
        } else {
            Outcome::Ok
        }
    }
}

/// Request logging middleware
///
/// Downloads are logged when their headers are ready; the attachment body
/// may stream for much longer.
pub async fn request_logger(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    match Outcome::from_status(status) {
        Outcome::Ok => match attachment_size(&response) {
            Some(bytes) => info!(
                "{} {} {} in {:?}, streaming {} bytes",
                method, uri, status, duration, bytes
            ),
            None => info!("{} {} {} in {:?}", method, uri, status, duration),
        },
        Outcome::Rejected => warn!("{} {} {} in {:?}", method, uri, status, duration),
        Outcome::Upstream => warn!(
            "{} {} {} in {:?} (manifest fetch failed upstream)",
            method, uri, status, duration
        ),
        Outcome::Failed => error!("{} {} {} in {:?}", method, uri, status, duration),
    }

    response
}

/// Content-Length of an attachment response
fn attachment_size(response: &Response) -> Option<u64> {
    response.headers().get(header::CONTENT_DISPOSITION)?;
    response
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
