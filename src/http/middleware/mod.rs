//! HTTP middleware.

pub mod timing;

pub use timing::track_timing;
