//! Firebase ID-token validator.
//!
//! Implements the `SessionValidator` port against Firebase Authentication.
//! ID tokens are RS256 JWTs signed with the `securetoken` service-account
//! keys, published in JWKS form. Keys are fetched lazily and cached
//! in-process; issuer and audience are pinned to the configured project.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthError, UserId};
use crate::ports::SessionValidator;

const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Configuration for the Firebase token validator.
#[derive(Debug, Clone)]
pub struct FirebaseValidatorConfig {
    /// The Firebase project id; pins both issuer and audience.
    pub project_id: String,

    /// Override for the key endpoint (tests).
    pub jwks_url: Option<String>,

    /// How long to cache fetched keys. Defaults to 1 hour.
    pub jwks_cache_duration: Option<Duration>,
}

impl FirebaseValidatorConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: None,
            jwks_cache_duration: None,
        }
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn jwks_url(&self) -> &str {
        self.jwks_url.as_deref().unwrap_or(SECURETOKEN_JWKS_URL)
    }
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iss: String,
    aud: String,
    #[allow(dead_code)]
    exp: i64,
}

struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }
}

/// Production `SessionValidator` backed by Firebase Authentication.
pub struct FirebaseSessionValidator {
    config: FirebaseValidatorConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl FirebaseSessionValidator {
    /// Create a new validator. Keys are fetched lazily on first validation.
    pub fn new(config: FirebaseValidatorConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        tracing::debug!(url, "fetching securetoken keys");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            tracing::error!("failed to fetch securetoken keys: {e}");
            AuthError::service_unavailable(format!("key fetch failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "securetoken key endpoint error");
            return Err(AuthError::service_unavailable(format!(
                "key endpoint returned {status}"
            )));
        }

        response.json().await.map_err(|e| {
            tracing::error!("failed to parse securetoken keys: {e}");
            AuthError::service_unavailable(format!("key parse failed: {e}"))
        })
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        let mut cache = self.jwks_cache.write().await;
        let duration = self
            .config
            .jwks_cache_duration
            .unwrap_or(Duration::from_secs(3600));
        *cache = Some(JwksCache::new(jwks.clone(), duration));

        Ok(jwks)
    }
}

#[async_trait]
impl SessionValidator for FirebaseSessionValidator {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("undecodable token header: {e}");
            AuthError::InvalidToken
        })?;
        let kid = header.kid.as_ref().ok_or_else(|| {
            tracing::debug!("token missing 'kid' header");
            AuthError::InvalidToken
        })?;

        let jwks = self.get_jwks().await?;
        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!(kid, "no matching securetoken key");
            AuthError::InvalidToken
        })?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!("unusable securetoken key: {e}");
            AuthError::InvalidToken
        })?;

        // Firebase signs ID tokens with RS256 exclusively.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<FirebaseClaims>(token, &decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!("token validation failed: {e}");
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = data.claims;
        if claims.iss != self.config.issuer() || claims.aud != self.config.project_id {
            tracing::warn!("issuer/audience mismatch after validation");
            return Err(AuthError::InvalidToken);
        }

        UserId::new(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

impl std::fmt::Debug for FirebaseSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseSessionValidator")
            .field("project_id", &self.config.project_id)
            .finish_non_exhaustive()
    }
}
