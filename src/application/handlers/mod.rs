//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across the ports.

mod reconcile_pair;
mod sync_entitlement;
mod verify_purchase;

pub use reconcile_pair::{ReconcileOutcome, ReconcilePairHandler};
pub use sync_entitlement::SyncEntitlementHandler;
pub use verify_purchase::{
    VerifyPurchaseCommand, VerifyPurchaseError, VerifyPurchaseHandler, VerifyPurchaseOutcome,
};
