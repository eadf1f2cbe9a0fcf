//! App Store verification configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// App Store configuration (verifyReceipt)
///
/// The whole section is optional at the root config level; an Android-only
/// deployment simply omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct AppStoreConfig {
    /// App-specific shared secret passed as `password` on verifyReceipt
    pub shared_secret: SecretString,
}

impl AppStoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.shared_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("APP_STORE_SHARED_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_empty_secret() {
        let config = AppStoreConfig {
            shared_secret: SecretString::new(String::new()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_accepts_secret() {
        let config = AppStoreConfig {
            shared_secret: SecretString::new("s3cret".to_string()),
        };
        assert!(config.validate().is_ok());
    }
}
