//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `firebase` - Production Firebase ID-token validation
//! - `mock` - Test implementation that doesn't require external services

mod firebase;
mod mock;

pub use firebase::{FirebaseSessionValidator, FirebaseValidatorConfig};
pub use mock::MockSessionValidator;
