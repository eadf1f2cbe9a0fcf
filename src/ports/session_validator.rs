//! Session validator port for identity-token verification.
//!
//! This port defines the contract for validating bearer identity tokens and
//! extracting the calling principal. It is provider-agnostic; implementations
//! exist for Firebase ID tokens and for mock testing.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId};

/// Verifies a bearer identity token and resolves the calling principal.
///
/// # Contract
///
/// Implementations must:
/// - Return the principal id only for a cryptographically valid, unexpired
///   token issued for this application
/// - Return `AuthError::InvalidToken` / `AuthError::TokenExpired` for
///   anything else presented as a token
/// - Return `AuthError::ServiceUnavailable` only for transient provider
///   failures (key fetch, network), never for bad tokens
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Verify a raw bearer token and return the principal it identifies.
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError>;
}
