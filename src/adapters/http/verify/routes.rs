//! Axum router configuration for the verification endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{method_not_allowed, pair_write, verify_purchase, VerifyAppState};

/// Create the verification router.
///
/// # Routes
///
/// - `POST /verifyPurchase` - verify a storefront receipt (bearer auth);
///   any other method gets a 405. Preflight is handled by the CORS
///   middleware before the router.
/// - `POST /internal/pairWrite` - pair-record change trigger, intended to
///   be reachable only from trusted infrastructure.
pub fn verify_router() -> Router<VerifyAppState> {
    Router::new()
        .route(
            "/verifyPurchase",
            post(verify_purchase).fallback(method_not_allowed),
        )
        .route("/internal/pairWrite", post(pair_write))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::store::InMemoryDocumentStore;

    fn test_state() -> VerifyAppState {
        VerifyAppState {
            session_validator: Arc::new(MockSessionValidator::new()),
            store: Arc::new(InMemoryDocumentStore::new()),
            app_store: None,
            play_store: None,
        }
    }

    #[test]
    fn verify_router_builds_with_state() {
        let router = verify_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
