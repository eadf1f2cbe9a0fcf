//! Play Store publisher API client.
//!
//! Fetches the current subscription state for a purchase token via
//! `purchases.subscriptions.get`, authorized with a service-account token.
//! Single call, no fallback tier.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::google::{GoogleTokenSource, ServiceAccountKey, TokenError};
use crate::domain::entitlement::PlaySubscription;
use crate::ports::{PlayStoreClient, VerificationError};

const DEFAULT_BASE_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";
const PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// Play Store client configuration.
#[derive(Debug, Clone)]
pub struct PlayStoreConfig {
    /// Android application package name.
    pub package_name: String,

    /// Override for the API base URL (tests).
    pub base_url: Option<String>,
}

impl PlayStoreConfig {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            base_url: None,
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn subscription_url(&self, subscription_id: &str, token: &str) -> String {
        format!(
            "{}/applications/{}/purchases/subscriptions/{}/tokens/{}",
            self.base_url(),
            self.package_name,
            subscription_id,
            token
        )
    }
}

/// Production `PlayStoreClient` over the publisher REST API.
pub struct PlayStoreHttpClient {
    config: PlayStoreConfig,
    tokens: GoogleTokenSource,
    http_client: reqwest::Client,
}

impl PlayStoreHttpClient {
    pub fn new(config: PlayStoreConfig, key: ServiceAccountKey) -> Result<Self, VerificationError> {
        let tokens = GoogleTokenSource::new(key, PUBLISHER_SCOPE)
            .map_err(|e| VerificationError::credentials(e.to_string()))?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| VerificationError::transport(e.to_string()))?;

        Ok(Self {
            config,
            tokens,
            http_client,
        })
    }
}

#[async_trait]
impl PlayStoreClient for PlayStoreHttpClient {
    async fn get_subscription(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<PlaySubscription, VerificationError> {
        let access_token = self.tokens.token().await.map_err(|e| match e {
            TokenError::Rejected(msg) | TokenError::MalformedKey(msg) => {
                VerificationError::credentials(msg)
            }
            TokenError::Transport(msg) => VerificationError::transport(msg),
        })?;

        let url = self.config.subscription_url(product_id, purchase_token);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| VerificationError::transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VerificationError::credentials(format!("status {status}")));
        }
        if !status.is_success() {
            return Err(VerificationError::unexpected(format!("status {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| VerificationError::unexpected(e.to_string()))
    }
}

impl std::fmt::Debug for PlayStoreHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayStoreHttpClient")
            .field("package_name", &self.config.package_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_url_embeds_package_product_and_token() {
        let config = PlayStoreConfig::new("app.duet");
        assert_eq!(
            config.subscription_url("plus.monthly", "tok123"),
            "https://androidpublisher.googleapis.com/androidpublisher/v3/applications/app.duet/purchases/subscriptions/plus.monthly/tokens/tok123"
        );
    }

    #[test]
    fn base_url_override_is_honored() {
        let config = PlayStoreConfig {
            base_url: Some("http://localhost:8099/v3".to_string()),
            ..PlayStoreConfig::new("app.duet")
        };
        assert!(config
            .subscription_url("p", "t")
            .starts_with("http://localhost:8099/v3/applications/app.duet/"));
    }
}
