//! Play Store verification configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Play Store configuration (androidpublisher)
///
/// The whole section is optional at the root config level. When
/// `service_account_json` is absent the store section's credential is
/// reused, which matches the usual single-service-account deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayStoreConfig {
    /// Android application package name
    pub package_name: String,

    /// Dedicated service-account key JSON, if different from the store's
    pub service_account_json: Option<SecretString>,
}

impl PlayStoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.package_name.is_empty() {
            return Err(ValidationError::MissingRequired("PLAY_STORE_PACKAGE_NAME"));
        }
        if let Some(json) = &self.service_account_json {
            if serde_json::from_str::<serde_json::Value>(json.expose_secret()).is_err() {
                return Err(ValidationError::InvalidServiceAccount);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_requires_package_name() {
        let config = PlayStoreConfig {
            package_name: String::new(),
            service_account_json: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_checks_dedicated_key_shape() {
        let config = PlayStoreConfig {
            package_name: "app.duet".to_string(),
            service_account_json: Some(SecretString::new("not json".to_string())),
        };
        assert!(config.validate().is_err());

        let config = PlayStoreConfig {
            package_name: "app.duet".to_string(),
            service_account_json: Some(SecretString::new("{}".to_string())),
        };
        assert!(config.validate().is_ok());
    }
}
