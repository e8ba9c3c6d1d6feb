//! Upstream failure classification.

/// Failure talking to the upstream origin.
///
/// Every variant is local to one request; none of them poison the shared pool.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection refused, DNS failure, TLS handshake failure.
    #[error("upstream connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// A configured connect or request timeout expired.
    #[error("upstream timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Protocol error or any other failure while exchanging the request.
    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The target URL could not be formed.
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    /// The client itself could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Request(_) => "request",
            UpstreamError::InvalidUrl(_) => "invalid_url",
            UpstreamError::Build(_) => "build",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout(e)
        } else if e.is_connect() {
            UpstreamError::Connect(e)
        } else {
            UpstreamError::Request(e)
        }
    }
}
