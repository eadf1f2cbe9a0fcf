//! HTTP adapters - REST API implementations.
//!
//! The `verify` module exposes the purchase verification and pair
//! reconciliation endpoints; `middleware` carries the CORS layer.

pub mod middleware;
pub mod verify;

// Re-export key types for convenience
pub use verify::{verify_router, VerifyAppState};
