//! Document store configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Document store configuration (Firestore REST)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Google Cloud project that hosts the document store
    pub project_id: String,

    /// Service-account key JSON used to mint access tokens
    pub service_account_json: SecretString,

    /// Override for the API base URL (local emulator)
    pub base_url: Option<String>,
}

impl StoreConfig {
    /// Validate store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id.is_empty() {
            return Err(ValidationError::MissingRequired("STORE_PROJECT_ID"));
        }
        let raw = self.service_account_json.expose_secret();
        if raw.is_empty() {
            return Err(ValidationError::MissingRequired(
                "STORE_SERVICE_ACCOUNT_JSON",
            ));
        }
        if serde_json::from_str::<serde_json::Value>(raw).is_err() {
            return Err(ValidationError::InvalidServiceAccount);
        }
        Ok(())
    }
}
