//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, state injection)
//!     → middleware/timing.rs (start clock)
//!     → request.rs (headers minus Host, cookies, buffered body)
//!     → upstream client
//!     → response.rs (status as-is, framing headers stripped, streamed body)
//!     → middleware/timing.rs (stop clock, access line)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
