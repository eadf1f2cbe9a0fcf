//! HTTP middleware for axum.
//!
//! - `cors` - permissive CORS handling with preflight short-circuit

pub mod cors;

pub use cors::cors_middleware;
