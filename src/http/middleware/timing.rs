//! Per-request timing and access logging.
//!
//! The clock stops once the handler has produced its response head, so the
//! measurement covers request processing and response initiation. Body
//! streaming can continue after the line is written.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Full URL of the inbound request as the caller addressed it.
pub fn request_url(request: &Request<Body>) -> String {
    let uri = request.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    format!("http://{}{}", host, path_and_query)
}

/// Human-readable access line.
pub fn access_line(method: &Method, url: &str, elapsed: Duration, status: StatusCode) -> String {
    format!(
        "Request: {} {} - Response Time: {:.4}s - Status: {}",
        method,
        url,
        elapsed.as_secs_f64(),
        status.as_u16()
    )
}

/// Middleware measuring each request and emitting exactly one access line.
pub async fn track_timing(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let url = request_url(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        url = %url,
        elapsed_secs = elapsed.as_secs_f64(),
        status = status.as_u16(),
        "{}",
        access_line(&method, &url, elapsed, status)
    );
    metrics::record_request(method.as_str(), status.as_u16(), elapsed);

    response
}
