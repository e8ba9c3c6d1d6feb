//! Outbound HTTP client bound to the single upstream origin.
//!
//! # Responsibilities
//! - Own the connection pool (keep-alive and TLS session reuse) for the origin
//! - Resolve inbound paths against the upstream base URL
//! - Issue requests with redirect following disabled
//! - Hand back responses whose body is still unread, so callers can stream it
//!
//! Compressed upstream bodies (gzip, deflate, br, zstd) are decoded while streaming;
//! the relay strips `content-encoding` accordingly.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use reqwest::redirect;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::error::UpstreamError;

/// Everything needed to issue one request against the upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// Path plus optional query, exactly as received (always starts with `/`).
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Cookies parsed from the inbound request, forwarded explicitly.
    pub cookies: Vec<(String, String)>,
}

/// Long-lived client for the upstream origin.
///
/// Cloning is cheap; clones share one connection pool and are safe to use
/// concurrently from any number of in-flight requests.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
    base: String,
}

impl UpstreamClient {
    /// Build the client and its connection pool.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut builder = reqwest::Client::builder()
            .redirect(redirect::Policy::none());

        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let inner = builder.build().map_err(UpstreamError::Build)?;

        // Joining is plain concatenation, so the base must not end with '/'.
        let base = parsed.as_str().trim_end_matches('/').to_string();

        tracing::info!(upstream = %base, "Upstream client initialized");

        Ok(Self { inner, base })
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Resolve an inbound path (and query) against the upstream base.
    pub fn target_url(&self, path_and_query: &str) -> Result<Url, UpstreamError> {
        let joined = if path_and_query.starts_with('/') {
            format!("{}{}", self.base, path_and_query)
        } else {
            format!("{}/{}", self.base, path_and_query)
        };
        Url::parse(&joined).map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    /// Send a request to the upstream.
    ///
    /// Redirects are never followed. The returned response has only its
    /// status line and headers read; the body is pulled lazily by the caller.
    pub async fn send(&self, request: OutboundRequest) -> Result<reqwest::Response, UpstreamError> {
        let url = self.target_url(&request.path_and_query)?;

        let headers = with_cookie_header(request.headers, &request.cookies);

        tracing::debug!(method = %request.method, url = %url, "Sending upstream request");

        self.inner
            .request(request.method, url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(UpstreamError::from)
    }

    /// Release the client handle. The pool closes once every clone, including
    /// those held by still-streaming responses, has been dropped.
    pub fn close(self) {
        tracing::info!(upstream = %self.base, "Upstream client closed");
        drop(self.inner);
    }
}

/// Add a `Cookie` header built from `cookies` unless one is already present.
pub fn with_cookie_header(mut headers: HeaderMap, cookies: &[(String, String)]) -> HeaderMap {
    if headers.contains_key(header::COOKIE) || cookies.is_empty() {
        return headers;
    }

    let cookie = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.insert(header::COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Dropping cookies that do not form a valid header"),
    }
    headers
}
