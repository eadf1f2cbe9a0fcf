//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Identity-token validators (Firebase, mock)
//! - `google` - Service-account OAuth token source
//! - `store` - Document stores (Firestore REST, in-memory)
//! - `storefront` - Verification-authority clients (App Store, Play Store)
//! - `http` - The axum HTTP surface

pub mod auth;
pub mod google;
pub mod http;
pub mod store;
pub mod storefront;
