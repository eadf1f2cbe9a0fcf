//! Pure derivation of a pair's shared entitlement state.

use crate::domain::foundation::UserId;

/// Derived shared entitlement state of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlusState {
    /// True iff at least one member currently has Plus.
    pub plus_active: bool,

    /// The first Plus member encountered, or none.
    pub plus_owner_uid: Option<UserId>,
}

impl PlusState {
    /// The state of a pair with no entitled members.
    pub fn none() -> Self {
        Self {
            plus_active: false,
            plus_owner_uid: None,
        }
    }
}

/// Folds member entitlement flags into the pair's derived state.
///
/// Members are visited in the order the storage layer returned them; the
/// first member with an active flag becomes the owner. That order is
/// storage-defined, not member-list-defined - deterministic per backend but
/// otherwise unspecified.
pub fn derive_plus_state<'a, I>(members: I) -> PlusState
where
    I: IntoIterator<Item = (&'a UserId, bool)>,
{
    let mut state = PlusState::none();
    for (uid, is_plus) in members {
        if is_plus {
            state.plus_active = true;
            if state.plus_owner_uid.is_none() {
                state.plus_owner_uid = Some(uid.clone());
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn no_members_derives_none() {
        assert_eq!(derive_plus_state([]), PlusState::none());
    }

    #[test]
    fn no_plus_members_derives_none() {
        let a = uid("a");
        let b = uid("b");
        let state = derive_plus_state([(&a, false), (&b, false)]);
        assert_eq!(state, PlusState::none());
    }

    #[test]
    fn single_plus_member_becomes_owner() {
        let a = uid("a");
        let b = uid("b");
        let state = derive_plus_state([(&a, false), (&b, true)]);
        assert!(state.plus_active);
        assert_eq!(state.plus_owner_uid, Some(uid("b")));
    }

    #[test]
    fn first_plus_member_in_visit_order_owns() {
        let a = uid("a");
        let b = uid("b");
        let state = derive_plus_state([(&b, true), (&a, true)]);
        assert_eq!(state.plus_owner_uid, Some(uid("b")));

        let state = derive_plus_state([(&a, true), (&b, true)]);
        assert_eq!(state.plus_owner_uid, Some(uid("a")));
    }

    #[test]
    fn derivation_is_idempotent() {
        let a = uid("a");
        let b = uid("b");
        let once = derive_plus_state([(&a, false), (&b, true)]);
        let twice = derive_plus_state([(&a, false), (&b, true)]);
        assert_eq!(once, twice);
    }
}
