//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so a bad config file is reported in one pass.

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.base_url '{0}' is not a valid URL: {1}")]
    InvalidUpstreamUrl(String, String),

    #[error("upstream.base_url '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("upstream.base_url '{0}' must not carry a query or fragment")]
    UpstreamHasQuery(String),

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.workers must be at least 1")]
    NoWorkers,

    #[error("limits.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("{0} must be greater than 0 when set")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base = &config.upstream.base_url;
    match Url::parse(base) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(base.clone()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::UpstreamHasQuery(base.clone()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl(base.clone(), e.to_string())),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.listener.workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.upstream.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("upstream.request_timeout_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
