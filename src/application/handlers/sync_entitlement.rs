//! SyncEntitlementHandler - persists a principal's entitlement flag.
//!
//! Idempotent: syncing the same flag twice converges to one persisted state,
//! and the pair derivation settles with no additional pair write on the
//! second call. Persistence failures propagate; this handler never fails
//! silently.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pair::{collections, UserRecord};
use crate::ports::{DocumentStore, StoreError};

use super::reconcile_pair::ReconcilePairHandler;

/// Handler that upserts `isPlus` on a user record and triggers pair
/// reconciliation when the user belongs to a pair.
pub struct SyncEntitlementHandler {
    store: Arc<dyn DocumentStore>,
    reconciler: ReconcilePairHandler,
}

impl SyncEntitlementHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let reconciler = ReconcilePairHandler::new(store.clone());
        Self { store, reconciler }
    }

    /// Persist the entitlement flag and reconcile the user's pair, if any.
    pub async fn handle(&self, uid: &UserId, is_active: bool) -> Result<(), StoreError> {
        // Field merge: other fields on the user record stay untouched.
        self.store
            .merge(
                collections::USERS,
                uid.as_str(),
                UserRecord::plus_merge(is_active, Timestamp::now()),
            )
            .await?;

        // Re-read to discover current pair membership; the pairing flow may
        // have changed it since the caller last looked.
        let Some(doc) = self.store.get(collections::USERS, uid.as_str()).await? else {
            return Ok(());
        };
        let Some(pair_id) = UserRecord::from_document(&doc).pair_id else {
            tracing::debug!(uid = %uid, "user is unpaired, sync complete");
            return Ok(());
        };

        self.reconciler.handle(&pair_id).await?;
        Ok(())
    }
}
