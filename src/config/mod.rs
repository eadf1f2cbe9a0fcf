//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the `DUET_`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use duet_entitlements::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod app_store;
mod auth;
mod error;
mod play_store;
mod server;
mod store;

pub use app_store::AppStoreConfig;
pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use play_store::PlayStoreConfig;
pub use server::{Environment, ServerConfig};
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// The storefront sections are optional; a deployment that serves only one
/// platform omits the other and requests for it fail with a configuration
/// error at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration (Firebase identity tokens)
    pub auth: AuthConfig,

    /// Document store configuration (Firestore REST)
    pub store: StoreConfig,

    /// App Store verification configuration
    pub app_store: Option<AppStoreConfig>,

    /// Play Store verification configuration
    pub play_store: Option<PlayStoreConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DUET` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DUET__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DUET__AUTH__FIREBASE_PROJECT_ID=...` -> `auth.firebase_project_id`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("DUET").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate()?;
        self.store.validate()?;
        if let Some(app_store) = &self.app_store {
            app_store.validate()?;
        }
        if let Some(play_store) = &self.play_store {
            play_store.validate()?;
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
