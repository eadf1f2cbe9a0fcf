//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, auth errors)
//! - `entitlement` - Receipt normalization into the canonical entitlement fact
//! - `pair` - User/pair records and the shared-entitlement derivation

pub mod entitlement;
pub mod foundation;
pub mod pair;
