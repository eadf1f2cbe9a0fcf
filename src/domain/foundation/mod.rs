//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier value objects, the timestamp type, and the
//! authentication error vocabulary shared by the rest of the domain.

mod auth;
mod ids;
mod timestamp;

pub use auth::AuthError;
pub use ids::{IdError, PairId, UserId};
pub use timestamp::Timestamp;
