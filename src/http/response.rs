//! Upstream → caller response relay.
//!
//! # Responsibilities
//! - Relay the upstream status unchanged (errors and redirects included)
//! - Strip transport-framing headers the serving layer recomputes
//! - Keep every `content-type` value the upstream sent
//! - Stream the body chunk by chunk as it arrives
//!
//! Dropping the returned body (caller went away) drops the upstream stream,
//! which stops reading and releases the upstream connection.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::Response;
use futures_util::StreamExt;

/// Headers describing how bytes were framed on the upstream hop.
pub const FRAMING_HEADERS: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

fn is_framing(name: &HeaderName) -> bool {
    FRAMING_HEADERS.iter().any(|h| h == name)
}

/// Copy upstream headers, minus framing headers.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if is_framing(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Turn an upstream response into the caller's response without buffering
/// the body.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = relayed_headers(upstream.headers());

    // Repeated content-type values are already copied above and kept as-is.
    if !headers.contains_key(header::CONTENT_TYPE) {
        if let Some(content_type) = upstream.headers().get(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
    }

    let stream = upstream.bytes_stream().map(|chunk| {
        if let Err(e) = &chunk {
            tracing::warn!(error = %e, "Upstream body ended early, terminating stream");
        }
        chunk
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
