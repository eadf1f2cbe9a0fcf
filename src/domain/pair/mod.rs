//! Pair domain - shared entitlement across a linked pair of users.
//!
//! A pair's `plusActive`/`plusOwnerUid` fields are derived state: a pure
//! function of the current members and their individual `isPlus` flags.
//! The derivation lives here; the read-derive-compare-write cycle around it
//! lives in the application layer.

mod derivation;
mod records;

pub use derivation::{derive_plus_state, PlusState};
pub use records::{collections, pair_fields, user_fields, PairRecord, UserRecord};
