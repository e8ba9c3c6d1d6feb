//! Inbound → outbound request translation.
//!
//! # Responsibilities
//! - Copy every inbound header except `Host`, duplicates and order included
//! - Parse inbound cookies for explicit pass-through
//! - Buffer the inbound body once, byte for byte (413 past the size cap)
//! - Carry path and query verbatim
//!
//! The inbound header map is only read, never mutated.

use axum::body::{self, Body};
use axum::http::{header, HeaderMap, Request};

use crate::error::ProxyError;
use crate::upstream::OutboundRequest;

/// Copy inbound headers for forwarding, dropping `Host`.
///
/// `HeaderMap` names are already lowercase, so the comparison is
/// case-insensitive with respect to what the caller sent.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound.iter() {
        if name == header::HOST {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Parse every `Cookie` header into ordered `(name, value)` pairs.
///
/// Malformed pairs (no `=`, empty name, non-visible-ASCII header) are skipped.
pub fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Build the outbound request, reading the whole inbound body.
pub async fn into_outbound(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<OutboundRequest, ProxyError> {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let body = body::to_bytes(body, max_body_bytes)
        .await
        .map_err(ProxyError::from_body_error)?;

    Ok(OutboundRequest {
        method: parts.method,
        path_and_query,
        headers: forwarded_headers(&parts.headers),
        body,
        cookies: parse_cookies(&parts.headers),
    })
}
