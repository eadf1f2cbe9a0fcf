//! Storefront verification-authority ports.
//!
//! Two variants of one capability: given opaque purchase credentials, fetch
//! the authoritative raw verification response. The responses keep their
//! provider shapes here; normalization into one entitlement fact happens in
//! `domain::entitlement`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entitlement::{AppleVerifyResponse, PlaySubscription};

/// Errors from a storefront verification call.
///
/// A failure here is a verification failure, never silently "not entitled";
/// non-entitlement is a successful response with an inactive entitlement.
#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    #[error("Verification authority unreachable: {0}")]
    Transport(String),

    #[error("Verification authority returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Verification authority rejected our credentials: {0}")]
    Credentials(String),
}

impl VerificationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }
}

/// App Store verification authority.
///
/// # Contract
///
/// Implementations must apply the production-then-sandbox fallback: when the
/// production authority answers with the sandbox-redirect status, exactly one
/// follow-up call goes to the sandbox authority and *that* response is
/// returned. Any other response is returned as-is with no second call.
#[async_trait]
pub trait AppStoreClient: Send + Sync {
    /// Verify a base64 receipt payload against the authority.
    async fn verify_receipt(
        &self,
        receipt_data: &str,
    ) -> Result<AppleVerifyResponse, VerificationError>;
}

/// Play Store publisher API.
#[async_trait]
pub trait PlayStoreClient: Send + Sync {
    /// Fetch the current subscription state for a purchase token.
    async fn get_subscription(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<PlaySubscription, VerificationError>;
}
