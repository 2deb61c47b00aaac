//! Per-request metrics.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

/// Count and time every routed request, labelled by route template so that
/// query strings do not explode label cardinality.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();
    debug!(%method, %endpoint, %status, ?duration, "request completed");
    metrics::counter!(
        "workout_history_http_requests_total",
        "method" => method.clone(),
        "endpoint" => endpoint.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "workout_history_http_request_duration_seconds",
        "method" => method,
        "endpoint" => endpoint
    )
    .record(duration.as_secs_f64());
    response
}
