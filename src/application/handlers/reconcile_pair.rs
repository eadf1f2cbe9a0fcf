//! ReconcilePairHandler - re-derives a pair's shared entitlement state.
//!
//! This handler is invoked from two independent triggers: directly after an
//! entitlement sync, and on every write to a pair record. It must converge
//! to the same fixed point regardless of call order or repetition, so the
//! derivation is pure and the final write is gated on a value-equality
//! check. A write that changes nothing produces no further write, which
//! breaks the trigger-write-trigger cycle.
//!
//! No lock or transaction spans the member read and the pair write; a race
//! can base one pass on stale member data, and the next trigger converges
//! the state.

use std::sync::Arc;

use crate::domain::foundation::{PairId, Timestamp};
use crate::domain::pair::{collections, derive_plus_state, PairRecord, PlusState, UserRecord};
use crate::ports::{DocumentStore, StoreError};

/// What a reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The pair record does not exist; nothing to reconcile.
    PairMissing,
    /// Stored state already matched the derivation; no write performed.
    Unchanged,
    /// Derived state differed and was written back.
    Updated(PlusState),
}

/// Handler that recomputes a pair's `plusActive`/`plusOwnerUid` fields.
pub struct ReconcilePairHandler {
    store: Arc<dyn DocumentStore>,
}

impl ReconcilePairHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reconcile one pair to the fixed point of its members' flags.
    pub async fn handle(&self, pair_id: &PairId) -> Result<ReconcileOutcome, StoreError> {
        let Some(doc) = self.store.get(collections::PAIRS, pair_id.as_str()).await? else {
            tracing::debug!(pair_id = %pair_id, "pair record absent, nothing to reconcile");
            return Ok(ReconcileOutcome::PairMissing);
        };
        let pair = PairRecord::from_document(&doc);

        let derived = if pair.member_uids.is_empty() {
            PlusState::none()
        } else {
            // Batch membership lookup, not N sequential reads. The returned
            // order decides the owner tie-break.
            let ids: Vec<String> = pair
                .member_uids
                .iter()
                .map(|uid| uid.as_str().to_string())
                .collect();
            let members = self.store.get_many(collections::USERS, &ids).await?;

            let parsed: Vec<_> = members
                .iter()
                .filter_map(|(id, doc)| {
                    let uid = crate::domain::foundation::UserId::new(id.as_str()).ok()?;
                    Some((uid, UserRecord::from_document(doc).is_plus))
                })
                .collect();
            derive_plus_state(parsed.iter().map(|(uid, is_plus)| (uid, *is_plus)))
        };

        if pair.matches(&derived) {
            tracing::debug!(pair_id = %pair_id, "pair state already consistent");
            return Ok(ReconcileOutcome::Unchanged);
        }

        tracing::info!(
            pair_id = %pair_id,
            plus_active = derived.plus_active,
            plus_owner = derived.plus_owner_uid.as_ref().map(|u| u.as_str()),
            "writing reconciled pair state"
        );
        self.store
            .merge(
                collections::PAIRS,
                pair_id.as_str(),
                PairRecord::plus_merge(&derived, Timestamp::now()),
            )
            .await?;

        Ok(ReconcileOutcome::Updated(derived))
    }
}
