//! Request instrumentation.
//!
//! Every request passes through [`track_requests`], which times the
//! downstream handler, reads back the response it produced and records the
//! result into the [`MetricsCollector`] plus one log line.

use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::metrics::{MetricsCollector, RequestLabels};

/// Path label used for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// What the downstream handler wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Status code sent to the client.
    pub status: StatusCode,
    /// Body length, when known up front.
    pub bytes: Option<u64>,
}

impl ResponseRecord {
    /// Capture status and body size from a finished response.
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status(),
            bytes: response.body().size_hint().exact(),
        }
    }
}

/// Time the request, then count it and log it.
pub async fn track_requests(
    State(metrics): State<MetricsCollector>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;

    let record = ResponseRecord::from_response(&response);
    let elapsed = start.elapsed();
    let labels = RequestLabels {
        path,
        method,
        status: record.status.as_u16(),
    };
    metrics.record_request(&labels, elapsed);

    info!(
        method = %labels.method,
        path = %labels.path,
        status = labels.status,
        bytes = record.bytes,
        duration_ms = elapsed.as_secs_f64() * 1000.0,
        "request completed"
    );

    response
}
