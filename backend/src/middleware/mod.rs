//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and cross-origin access.

pub mod cors;
pub mod trace;

pub use cors::CorsPolicy;
pub use trace::Trace;
