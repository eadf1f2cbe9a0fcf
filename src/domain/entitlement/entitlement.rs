//! The canonical entitlement fact.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// The derived fact of whether a principal currently has active paid access.
///
/// This is a transient value: it is computed by a normalizer and returned to
/// the caller, but only the `active` boolean is ever persisted on the user
/// record. The richer fields are response-only by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Whether paid access is currently active.
    pub active: bool,

    /// When the underlying subscription expires, if known.
    pub expires_at: Option<Timestamp>,

    /// The product the entitlement was resolved against, if known.
    pub product_id: Option<String>,
}

impl Entitlement {
    /// The inactive entitlement with no metadata.
    pub fn inactive() -> Self {
        Self {
            active: false,
            expires_at: None,
            product_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_has_no_metadata() {
        let e = Entitlement::inactive();
        assert!(!e.active);
        assert!(e.expires_at.is_none());
        assert!(e.product_id.is_none());
    }
}
