//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (method, path?query, headers minus Host, body, cookies)
//!     → client.rs (resolve against base URL, send, no redirects)
//!     → reqwest::Response (status + headers read, body unread)
//!     → http/response.rs streams the body to the caller
//! ```
//!
//! # Design Decisions
//! - One client per process, created at startup and closed at shutdown
//! - The client is injected into handlers through router state, never global
//! - No retries, no backoff; failures surface as `UpstreamError`

pub mod client;
pub mod error;

pub use client::{OutboundRequest, UpstreamClient};
pub use error::UpstreamError;
