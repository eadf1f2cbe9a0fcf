//! Play Store subscription model and normalization.
//!
//! The publisher API returns one subscription resource per purchase token.
//! Normalization consults only `expiryTimeMillis`: the entitlement is active
//! exactly when the expiry is strictly in the future. No cancellation or
//! refund signal is read for this provider - flagged for product
//! clarification, preserved as shipped.

use serde::Deserialize;

use super::millis;
use super::Entitlement;
use crate::domain::foundation::Timestamp;

/// Raw `purchases.subscriptions.get` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySubscription {
    /// Subscription expiry, milliseconds since epoch (string on the wire).
    #[serde(default, deserialize_with = "millis::deserialize_opt")]
    pub expiry_time_millis: Option<u64>,

    /// Purchase start, milliseconds since epoch. Informational only.
    #[serde(default, deserialize_with = "millis::deserialize_opt")]
    pub start_time_millis: Option<u64>,

    /// Whether the subscription auto-renews. Informational only.
    #[serde(default)]
    pub auto_renewing: Option<bool>,
}

/// Resolves the entitlement fact from a Play Store subscription.
///
/// `active == expiry > now`; a boundary expiry equal to `now` is inactive,
/// and a missing expiry is never treated as unlimited.
pub fn resolve_entitlement(
    subscription: &PlaySubscription,
    requested_product: Option<&str>,
    now: Timestamp,
) -> Entitlement {
    let expiry_ms = millis::nonzero(subscription.expiry_time_millis);
    let active = expiry_ms
        .map(|ms| ms as i64 > now.as_unix_millis())
        .unwrap_or(false);

    Entitlement {
        active,
        expires_at: expiry_ms.and_then(Timestamp::from_unix_millis),
        product_id: requested_product.map(str::to_string),
    }
}
