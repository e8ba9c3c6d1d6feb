//! Transparent HTTP reverse proxy library.
//!
//! Every method on every path is forwarded to one fixed upstream origin,
//! with the response streamed back and one access line logged per request.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::UpstreamClient;
