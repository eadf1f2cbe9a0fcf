//! Verification HTTP module.
//!
//! Routes, handlers, and DTOs for `/verifyPurchase` and the internal
//! pair-write trigger.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::VerifyAppState;
pub use routes::verify_router;
