//! App Store receipt model and normalization.
//!
//! The verifyReceipt response carries a transaction list, either as
//! `latest_receipt_info` (preferred) or nested under `receipt.in_app`.
//! Normalization selects the most recent transaction for the requested
//! product and derives the entitlement from its expiry and cancellation
//! timestamps.

use serde::Deserialize;

use super::millis;
use super::Entitlement;
use crate::domain::foundation::Timestamp;

/// A successful verification, per the verification authority.
pub const STATUS_OK: i64 = 0;

/// Raw verifyReceipt response body.
///
/// Only the fields consumed by normalization are modeled; the authority
/// sends many more.
#[derive(Debug, Clone, Deserialize)]
pub struct AppleVerifyResponse {
    /// Authority status code. `0` means the receipt is valid.
    pub status: i64,

    /// Decoded receipt transactions, most-recent form.
    #[serde(default)]
    pub latest_receipt_info: Option<Vec<AppleTransaction>>,

    /// Decoded receipt envelope, fallback source of transactions.
    #[serde(default)]
    pub receipt: Option<AppleReceipt>,
}

/// Receipt envelope carrying the in-app purchase list.
#[derive(Debug, Clone, Deserialize)]
pub struct AppleReceipt {
    #[serde(default)]
    pub in_app: Option<Vec<AppleTransaction>>,
}

/// One transaction record in a verified receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct AppleTransaction {
    #[serde(default)]
    pub product_id: Option<String>,

    /// Subscription expiry, milliseconds since epoch.
    #[serde(default, deserialize_with = "millis::deserialize_opt")]
    pub expires_date_ms: Option<u64>,

    /// Purchase time, milliseconds since epoch.
    #[serde(default, deserialize_with = "millis::deserialize_opt")]
    pub purchase_date_ms: Option<u64>,

    /// Refund/cancellation time; zero or absent means not cancelled.
    #[serde(default, deserialize_with = "millis::deserialize_opt")]
    pub cancellation_date_ms: Option<u64>,
}

impl AppleTransaction {
    /// Recency key: the later of expiry and purchase time.
    fn recency_ms(&self) -> u64 {
        self.expires_date_ms
            .unwrap_or(0)
            .max(self.purchase_date_ms.unwrap_or(0))
    }
}

impl AppleVerifyResponse {
    /// The transaction list, preferring `latest_receipt_info`.
    fn transactions(&self) -> &[AppleTransaction] {
        if let Some(list) = &self.latest_receipt_info {
            return list;
        }
        if let Some(receipt) = &self.receipt {
            if let Some(list) = &receipt.in_app {
                return list;
            }
        }
        &[]
    }
}

/// Resolves the entitlement fact from a verified App Store receipt.
///
/// Filters transactions to `requested_product` when one is supplied, then
/// selects the record with the greatest recency key. Ties keep the
/// earlier-seen record (strict `>` during the fold). The entitlement is
/// active only if the selected expiry is in the future and the record
/// carries no cancellation timestamp.
pub fn resolve_entitlement(
    response: &AppleVerifyResponse,
    requested_product: Option<&str>,
    now: Timestamp,
) -> Entitlement {
    let latest = response
        .transactions()
        .iter()
        .filter(|tx| match requested_product {
            Some(product) => tx.product_id.as_deref() == Some(product),
            None => true,
        })
        .fold(None::<&AppleTransaction>, |best, tx| match best {
            Some(current) if tx.recency_ms() > current.recency_ms() => Some(tx),
            Some(current) => Some(current),
            None => Some(tx),
        });

    let Some(latest) = latest else {
        return Entitlement::inactive();
    };

    let expires_ms = millis::nonzero(latest.expires_date_ms);
    let cancelled = millis::nonzero(latest.cancellation_date_ms).is_some();
    let active = expires_ms
        .map(|ms| ms as i64 > now.as_unix_millis())
        .unwrap_or(false)
        && !cancelled;

    Entitlement {
        active,
        expires_at: expires_ms.and_then(Timestamp::from_unix_millis),
        product_id: latest
            .product_id
            .clone()
            .or_else(|| requested_product.map(str::to_string)),
    }
}
