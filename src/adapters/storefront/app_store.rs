//! App Store verifyReceipt client.
//!
//! The verification authority refuses to check production and sandbox
//! receipts in one call. Status 21007 on the production endpoint means "this
//! receipt belongs to the sandbox environment"; the client then issues
//! exactly one follow-up call against the sandbox endpoint and returns that
//! response instead. Any other status comes back as-is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::entitlement::AppleVerifyResponse;
use crate::ports::{AppStoreClient, VerificationError};

const PRODUCTION_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
const SANDBOX_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Status meaning "sandbox receipt sent to the production authority".
const STATUS_SANDBOX_RECEIPT: i64 = 21007;

/// App Store client configuration.
#[derive(Clone)]
pub struct AppStoreConfig {
    /// App-specific shared secret for auto-renewable subscriptions.
    pub shared_secret: SecretString,

    /// Endpoint overrides (tests).
    pub production_url: Option<String>,
    pub sandbox_url: Option<String>,
}

impl AppStoreConfig {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: SecretString::new(shared_secret.into()),
            production_url: None,
            sandbox_url: None,
        }
    }

    fn production_url(&self) -> &str {
        self.production_url.as_deref().unwrap_or(PRODUCTION_URL)
    }

    fn sandbox_url(&self) -> &str {
        self.sandbox_url.as_deref().unwrap_or(SANDBOX_URL)
    }
}

#[derive(Debug, Serialize)]
struct VerifyPayload<'a> {
    #[serde(rename = "receipt-data")]
    receipt_data: &'a str,
    password: &'a str,
    #[serde(rename = "exclude-old-transactions")]
    exclude_old_transactions: bool,
}

/// One POST to a verification endpoint. Seam for testing the fallback
/// without a network.
#[async_trait]
trait VerifyTransport: Send + Sync {
    async fn post_verify(
        &self,
        url: &str,
        payload: &VerifyPayload<'_>,
    ) -> Result<AppleVerifyResponse, VerificationError>;
}

struct ReqwestTransport {
    http_client: reqwest::Client,
}

#[async_trait]
impl VerifyTransport for ReqwestTransport {
    async fn post_verify(
        &self,
        url: &str,
        payload: &VerifyPayload<'_>,
    ) -> Result<AppleVerifyResponse, VerificationError> {
        let response = self
            .http_client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| VerificationError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::unexpected(format!(
                "status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| VerificationError::unexpected(e.to_string()))
    }
}

/// Production `AppStoreClient` with the two-tier endpoint fallback.
pub struct AppStoreHttpClient {
    config: AppStoreConfig,
    transport: Arc<dyn VerifyTransport>,
}

impl AppStoreHttpClient {
    pub fn new(config: AppStoreConfig) -> Result<Self, VerificationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| VerificationError::transport(e.to_string()))?;

        Ok(Self {
            config,
            transport: Arc::new(ReqwestTransport { http_client }),
        })
    }

    #[cfg(test)]
    fn with_transport(config: AppStoreConfig, transport: Arc<dyn VerifyTransport>) -> Self {
        Self { config, transport }
    }
}

#[async_trait]
impl AppStoreClient for AppStoreHttpClient {
    async fn verify_receipt(
        &self,
        receipt_data: &str,
    ) -> Result<AppleVerifyResponse, VerificationError> {
        let payload = VerifyPayload {
            receipt_data,
            password: self.config.shared_secret.expose_secret(),
            exclude_old_transactions: true,
        };

        let production = self
            .transport
            .post_verify(self.config.production_url(), &payload)
            .await?;

        if production.status == STATUS_SANDBOX_RECEIPT {
            tracing::debug!("production authority redirected to sandbox");
            return self
                .transport
                .post_verify(self.config.sandbox_url(), &payload)
                .await;
        }

        Ok(production)
    }
}

impl std::fmt::Debug for AppStoreHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStoreHttpClient")
            .field("production_url", &self.config.production_url())
            .finish_non_exhaustive()
    }
}
