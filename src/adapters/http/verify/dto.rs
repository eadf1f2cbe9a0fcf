//! HTTP DTOs for the verification endpoints.
//!
//! Field names match the mobile clients' wire contract, so these types use
//! camelCase serde renames rather than the crate's snake_case convention.

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::Entitlement;

/// Inbound body for `POST /verifyPurchase`.
///
/// Every field is optional at the deserialization layer; required-field
/// checks happen in the handler so a missing field produces a 400 with a
/// stable message instead of a serde rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchaseRequest {
    pub platform: Option<String>,
    pub product_id: Option<String>,
    pub verification_data: Option<String>,
    pub verification_source: Option<String>,
}

/// Successful verification response.
///
/// `expires_at` and `product_id` are serialized even when null; the clients
/// distinguish "no expiry known" from a dropped key. `verification_source`
/// is only present when the request carried one (iOS).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchaseResponse {
    pub active: bool,
    pub expires_at: Option<String>,
    pub product_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_source: Option<String>,
}

impl VerifyPurchaseResponse {
    pub fn from_entitlement(
        entitlement: Entitlement,
        status: String,
        verification_source: Option<String>,
    ) -> Self {
        Self {
            active: entitlement.active,
            expires_at: entitlement.expires_at.map(|t| t.to_rfc3339()),
            product_id: entitlement.product_id,
            status,
            verification_source,
        }
    }
}

/// Response when the verification authority rejects the receipt outright.
/// Carries only the authority's status code, no entitlement fields.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedResponse {
    pub active: bool,
    pub status: String,
}

impl RejectedResponse {
    pub fn new(status: i64) -> Self {
        Self {
            active: false,
            status: status.to_string(),
        }
    }
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub active: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            active: false,
            error: error.into(),
        }
    }
}

/// Inbound body for the internal pair-write trigger.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairWriteRequest {
    pub pair_id: Option<String>,
    /// True when the pair record was deleted; reconciliation is skipped.
    #[serde(default)]
    pub deleted: bool,
}

/// Outcome body for the pair-write trigger.
#[derive(Debug, Clone, Serialize)]
pub struct PairWriteResponse {
    pub status: &'static str,
}
