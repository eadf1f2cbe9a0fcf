//! User and pair record models over the document-store field maps.
//!
//! Records are stored as loosely-typed documents; conversion here is
//! deliberately lenient (a missing or mistyped field reads as absent, never
//! as an error) because this core shares the collections with other writers.

use serde_json::{json, Value};

use super::PlusState;
use crate::domain::foundation::{PairId, Timestamp, UserId};
use crate::ports::Document;

/// Collection names in the shared document store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PAIRS: &str = "pairs";
}

/// Field names on a user record.
pub mod user_fields {
    pub const IS_PLUS: &str = "isPlus";
    pub const PAIR_ID: &str = "pairId";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Field names on a pair record.
pub mod pair_fields {
    pub const MEMBER_UIDS: &str = "memberUids";
    pub const PLUS_ACTIVE: &str = "plusActive";
    pub const PLUS_OWNER_UID: &str = "plusOwnerUid";
    pub const PLUS_GRACE_UNTIL: &str = "plusGraceUntil";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// A principal's record as this core sees it.
///
/// Only `isPlus` is mutated here; `pairId` is owned by the pairing flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub is_plus: bool,
    pub pair_id: Option<PairId>,
}

impl UserRecord {
    /// Reads a user record from a document field map.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            // Strict boolean check: anything else counts as not-Plus.
            is_plus: doc
                .get(user_fields::IS_PLUS)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            pair_id: doc
                .get(user_fields::PAIR_ID)
                .and_then(Value::as_str)
                .and_then(|s| PairId::new(s).ok()),
        }
    }

    /// The merge payload that persists an entitlement flag.
    pub fn plus_merge(is_plus: bool, updated_at: Timestamp) -> Document {
        let mut fields = Document::new();
        fields.insert(user_fields::IS_PLUS.to_string(), json!(is_plus));
        fields.insert(
            user_fields::UPDATED_AT.to_string(),
            json!(updated_at.to_rfc3339()),
        );
        fields
    }
}

/// A pair's record as this core sees it.
///
/// `plus_active` is `None` when the field has never been written, which is
/// distinct from an explicit `false`: a freshly-emptied pair must still
/// receive its one reset write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    pub member_uids: Vec<UserId>,
    pub plus_active: Option<bool>,
    pub plus_owner_uid: Option<UserId>,
}

impl PairRecord {
    /// Reads a pair record from a document field map.
    pub fn from_document(doc: &Document) -> Self {
        let member_uids = doc
            .get(pair_fields::MEMBER_UIDS)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|s| UserId::new(s).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            member_uids,
            plus_active: doc.get(pair_fields::PLUS_ACTIVE).and_then(Value::as_bool),
            plus_owner_uid: doc
                .get(pair_fields::PLUS_OWNER_UID)
                .and_then(Value::as_str)
                .and_then(|s| UserId::new(s).ok()),
        }
    }

    /// Whether the stored state already equals a derived state.
    ///
    /// A never-written `plusActive` never matches, so the first derivation
    /// always produces a write.
    pub fn matches(&self, derived: &PlusState) -> bool {
        self.plus_active == Some(derived.plus_active)
            && self.plus_owner_uid == derived.plus_owner_uid
    }

    /// The merge payload that persists a derived state.
    ///
    /// `plusGraceUntil` is always cleared here; its computation is out of
    /// scope of this core.
    pub fn plus_merge(derived: &PlusState, updated_at: Timestamp) -> Document {
        let mut fields = Document::new();
        fields.insert(
            pair_fields::PLUS_ACTIVE.to_string(),
            json!(derived.plus_active),
        );
        fields.insert(
            pair_fields::PLUS_OWNER_UID.to_string(),
            match &derived.plus_owner_uid {
                Some(uid) => json!(uid.as_str()),
                None => Value::Null,
            },
        );
        fields.insert(pair_fields::PLUS_GRACE_UNTIL.to_string(), Value::Null);
        fields.insert(
            pair_fields::UPDATED_AT.to_string(),
            json!(updated_at.to_rfc3339()),
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn user_record_reads_fields() {
        let record = UserRecord::from_document(&doc(json!({
            "isPlus": true,
            "pairId": "pair-1",
            "updatedAt": "2026-01-01T00:00:00Z"
        })));
        assert!(record.is_plus);
        assert_eq!(record.pair_id.unwrap().as_str(), "pair-1");
    }

    #[test]
    fn user_record_tolerates_missing_and_mistyped_fields() {
        let record = UserRecord::from_document(&doc(json!({ "isPlus": "yes" })));
        assert!(!record.is_plus);
        assert!(record.pair_id.is_none());

        let record = UserRecord::from_document(&Document::new());
        assert!(!record.is_plus);
    }

    #[test]
    fn user_plus_merge_touches_only_entitlement_fields() {
        let ts = Timestamp::from_unix_millis(1_700_000_000_000).unwrap();
        let fields = UserRecord::plus_merge(true, ts);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("isPlus"), Some(&json!(true)));
        assert!(fields.contains_key("updatedAt"));
    }

    #[test]
    fn pair_record_reads_members_and_state() {
        let record = PairRecord::from_document(&doc(json!({
            "memberUids": ["a", "b"],
            "plusActive": true,
            "plusOwnerUid": "a"
        })));
        assert_eq!(record.member_uids.len(), 2);
        assert_eq!(record.plus_active, Some(true));
        assert_eq!(record.plus_owner_uid.unwrap().as_str(), "a");
    }

    #[test]
    fn never_written_plus_active_is_distinct_from_false() {
        let record = PairRecord::from_document(&doc(json!({ "memberUids": [] })));
        assert_eq!(record.plus_active, None);

        let derived = PlusState {
            plus_active: false,
            plus_owner_uid: None,
        };
        assert!(!record.matches(&derived));
    }

    #[test]
    fn matches_compares_both_fields() {
        let record = PairRecord::from_document(&doc(json!({
            "memberUids": ["a"],
            "plusActive": true,
            "plusOwnerUid": "a"
        })));

        let same = PlusState {
            plus_active: true,
            plus_owner_uid: Some(UserId::new("a").unwrap()),
        };
        assert!(record.matches(&same));

        let other_owner = PlusState {
            plus_active: true,
            plus_owner_uid: Some(UserId::new("b").unwrap()),
        };
        assert!(!record.matches(&other_owner));
    }

    #[test]
    fn pair_plus_merge_always_clears_grace() {
        let ts = Timestamp::from_unix_millis(1_700_000_000_000).unwrap();
        let derived = PlusState {
            plus_active: false,
            plus_owner_uid: None,
        };
        let fields = PairRecord::plus_merge(&derived, ts);
        assert_eq!(fields.get("plusGraceUntil"), Some(&Value::Null));
        assert_eq!(fields.get("plusOwnerUid"), Some(&Value::Null));
        assert_eq!(fields.get("plusActive"), Some(&json!(false)));
    }
}
