//! Entitlement domain - normalizing storefront receipts into one fact.
//!
//! Each storefront answers a purchase-verification query with a different
//! shape: the App Store returns a transaction list, the Play Store a single
//! subscription resource. The normalizers in this module fold either shape
//! into the canonical [`Entitlement`] value. They are pure functions of the
//! raw response, the requested product, and the current time.

mod app_store;
mod entitlement;
mod millis;
mod play_store;

pub use app_store::{
    resolve_entitlement as resolve_apple, AppleReceipt, AppleTransaction, AppleVerifyResponse,
    STATUS_OK,
};
pub use entitlement::Entitlement;
pub use play_store::{resolve_entitlement as resolve_play, PlaySubscription};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront platform tag, selected by the caller at the endpoint boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Parses the wire value (`"ios"` / `"android"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ios" => Some(Platform::Ios),
            "android" => Some(Platform::Android),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_known_tags() {
        assert_eq!(Platform::parse("ios"), Some(Platform::Ios));
        assert_eq!(Platform::parse("android"), Some(Platform::Android));
        assert_eq!(Platform::parse("web"), None);
        assert_eq!(Platform::parse("IOS"), None);
    }

    #[test]
    fn platform_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), "\"ios\"");
        assert_eq!(
            serde_json::to_string(&Platform::Android).unwrap(),
            "\"android\""
        );
    }
}
