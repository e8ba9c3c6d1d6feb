//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http/middleware/timing.rs → one access line per request (tracing)
//!                           → request counter + latency histogram (metrics)
//! http/server.rs            → upstream error counter
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
