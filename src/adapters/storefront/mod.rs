//! Storefront verification-authority adapters.
//!
//! - `app_store` - verifyReceipt client with production→sandbox fallback
//! - `play_store` - androidpublisher v3 subscriptions client

mod app_store;
mod play_store;

pub use app_store::{AppStoreConfig, AppStoreHttpClient};
pub use play_store::{PlayStoreConfig, PlayStoreHttpClient};
