//! Request-level errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::upstream::UpstreamError;

/// Failure while proxying a single request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The inbound body exceeded `limits.max_body_bytes`.
    #[error("request body too large: {0}")]
    BodyTooLarge(#[source] axum::Error),

    /// The inbound body could not be read (client aborted, malformed framing).
    #[error("failed to read request body: {0}")]
    InboundBody(#[source] axum::Error),

    /// The upstream could not be reached or failed before sending headers.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    /// Classify a body read failure, separating the size limit from the rest.
    pub fn from_body_error(err: axum::Error) -> Self {
        if exceeded_length_limit(&err) {
            ProxyError::BodyTooLarge(err)
        } else {
            ProxyError::InboundBody(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InboundBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

fn exceeded_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::BodyTooLarge(_) => "Request body too large",
            ProxyError::InboundBody(_) => "Failed to read request body",
            ProxyError::Upstream(_) => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}
