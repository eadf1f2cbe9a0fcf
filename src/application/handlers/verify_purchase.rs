//! VerifyPurchaseHandler - orchestrates a storefront verification.
//!
//! Dispatches to the storefront client for the requested platform,
//! normalizes the raw response into the canonical entitlement fact, and
//! syncs the boolean onto the caller's record. Non-entitlement is a
//! successful outcome, never an error.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::entitlement::{self, Entitlement, Platform};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{AppStoreClient, PlayStoreClient, StoreError, VerificationError};

use super::sync_entitlement::SyncEntitlementHandler;

/// Command to verify a purchase for an authenticated principal.
#[derive(Debug, Clone)]
pub struct VerifyPurchaseCommand {
    pub uid: UserId,
    pub platform: Platform,
    pub product_id: String,
    /// Opaque credential: base64 receipt (iOS) or purchase token (Android).
    pub verification_data: String,
    /// Client-reported origin of the credential, echoed back on iOS.
    pub verification_source: Option<String>,
}

/// Result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyPurchaseOutcome {
    /// The verification authority rejected the receipt outright.
    /// No entitlement is derived and nothing is persisted.
    Rejected { status: i64 },
    /// The authority answered; the normalized entitlement was synced.
    Verified {
        entitlement: Entitlement,
        status: String,
        verification_source: Option<String>,
    },
}

/// Errors from the verification flow.
///
/// All of these surface as internal (5xx) failures at the endpoint; auth and
/// input validation are handled before the command is built.
#[derive(Debug, Error)]
pub enum VerifyPurchaseError {
    #[error("{0} verification is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Handler that runs the verify → normalize → sync pipeline.
pub struct VerifyPurchaseHandler {
    app_store: Option<Arc<dyn AppStoreClient>>,
    play_store: Option<Arc<dyn PlayStoreClient>>,
    sync: SyncEntitlementHandler,
}

impl VerifyPurchaseHandler {
    pub fn new(
        app_store: Option<Arc<dyn AppStoreClient>>,
        play_store: Option<Arc<dyn PlayStoreClient>>,
        sync: SyncEntitlementHandler,
    ) -> Self {
        Self {
            app_store,
            play_store,
            sync,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPurchaseCommand,
    ) -> Result<VerifyPurchaseOutcome, VerifyPurchaseError> {
        match cmd.platform {
            Platform::Ios => self.handle_ios(cmd).await,
            Platform::Android => self.handle_android(cmd).await,
        }
    }

    async fn handle_ios(
        &self,
        cmd: VerifyPurchaseCommand,
    ) -> Result<VerifyPurchaseOutcome, VerifyPurchaseError> {
        let client = self
            .app_store
            .as_ref()
            .ok_or(VerifyPurchaseError::NotConfigured("App Store"))?;

        let raw = client.verify_receipt(&cmd.verification_data).await?;
        if raw.status != entitlement::STATUS_OK {
            tracing::info!(uid = %cmd.uid, status = raw.status, "receipt rejected by authority");
            return Ok(VerifyPurchaseOutcome::Rejected { status: raw.status });
        }

        let entitlement =
            entitlement::resolve_apple(&raw, Some(&cmd.product_id), Timestamp::now());
        self.sync.handle(&cmd.uid, entitlement.active).await?;

        Ok(VerifyPurchaseOutcome::Verified {
            entitlement,
            status: "active".to_string(),
            verification_source: cmd.verification_source,
        })
    }

    async fn handle_android(
        &self,
        cmd: VerifyPurchaseCommand,
    ) -> Result<VerifyPurchaseOutcome, VerifyPurchaseError> {
        let client = self
            .play_store
            .as_ref()
            .ok_or(VerifyPurchaseError::NotConfigured("Play Store"))?;

        let subscription = client
            .get_subscription(&cmd.product_id, &cmd.verification_data)
            .await?;

        let entitlement =
            entitlement::resolve_play(&subscription, Some(&cmd.product_id), Timestamp::now());
        self.sync.handle(&cmd.uid, entitlement.active).await?;

        let status = if entitlement.active { "active" } else { "expired" };
        Ok(VerifyPurchaseOutcome::Verified {
            entitlement,
            status: status.to_string(),
            verification_source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryDocumentStore;
    use crate::domain::entitlement::{AppleVerifyResponse, PlaySubscription};
    use crate::ports::DocumentStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedAppStore {
        response: serde_json::Value,
    }

    #[async_trait]
    impl AppStoreClient for FixedAppStore {
        async fn verify_receipt(
            &self,
            _receipt_data: &str,
        ) -> Result<AppleVerifyResponse, VerificationError> {
            serde_json::from_value(self.response.clone())
                .map_err(|e| VerificationError::unexpected(e.to_string()))
        }
    }

    struct FixedPlayStore {
        response: serde_json::Value,
    }

    #[async_trait]
    impl PlayStoreClient for FixedPlayStore {
        async fn get_subscription(
            &self,
            _product_id: &str,
            _purchase_token: &str,
        ) -> Result<PlaySubscription, VerificationError> {
            serde_json::from_value(self.response.clone())
                .map_err(|e| VerificationError::unexpected(e.to_string()))
        }
    }

    fn future_ms() -> u64 {
        (Timestamp::now().as_unix_millis() + 3_600_000) as u64
    }

    fn cmd(platform: Platform) -> VerifyPurchaseCommand {
        VerifyPurchaseCommand {
            uid: UserId::new("u1").unwrap(),
            platform,
            product_id: "plus.monthly".to_string(),
            verification_data: "opaque".to_string(),
            verification_source: Some("app".to_string()),
        }
    }

    fn handler_with(
        app: Option<Arc<dyn AppStoreClient>>,
        play: Option<Arc<dyn PlayStoreClient>>,
    ) -> (VerifyPurchaseHandler, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let sync = SyncEntitlementHandler::new(store.clone());
        (VerifyPurchaseHandler::new(app, play, sync), store)
    }

    #[tokio::test]
    async fn ios_valid_receipt_syncs_and_reports_active() {
        let app = Arc::new(FixedAppStore {
            response: json!({
                "status": 0,
                "latest_receipt_info": [{
                    "product_id": "plus.monthly",
                    "expires_date_ms": future_ms().to_string(),
                    "purchase_date_ms": "1700000000000"
                }]
            }),
        });
        let (handler, store) = handler_with(Some(app), None);

        let outcome = handler.handle(cmd(Platform::Ios)).await.unwrap();
        let VerifyPurchaseOutcome::Verified {
            entitlement,
            status,
            verification_source,
        } = outcome
        else {
            panic!("expected verified outcome");
        };
        assert!(entitlement.active);
        assert_eq!(status, "active");
        assert_eq!(verification_source.as_deref(), Some("app"));

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("isPlus"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn ios_rejected_receipt_persists_nothing() {
        let app = Arc::new(FixedAppStore {
            response: json!({ "status": 21003 }),
        });
        let (handler, store) = handler_with(Some(app), None);

        let outcome = handler.handle(cmd(Platform::Ios)).await.unwrap();
        assert_eq!(outcome, VerifyPurchaseOutcome::Rejected { status: 21003 });
        assert!(store.get("users", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn android_expired_subscription_syncs_inactive() {
        let play = Arc::new(FixedPlayStore {
            response: json!({ "expiryTimeMillis": "1000" }),
        });
        let (handler, store) = handler_with(None, Some(play));

        let outcome = handler.handle(cmd(Platform::Android)).await.unwrap();
        let VerifyPurchaseOutcome::Verified {
            entitlement,
            status,
            verification_source,
        } = outcome
        else {
            panic!("expected verified outcome");
        };
        assert!(!entitlement.active);
        assert_eq!(status, "expired");
        assert_eq!(verification_source, None);

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("isPlus"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn unconfigured_platform_is_a_configuration_error() {
        let (handler, _) = handler_with(None, None);

        let err = handler.handle(cmd(Platform::Android)).await.unwrap_err();
        assert!(matches!(err, VerifyPurchaseError::NotConfigured("Play Store")));
    }
}
