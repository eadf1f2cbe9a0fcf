//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionValidator` - identity-token verification
//! - `DocumentStore` - shared document storage (get / get_many / merge)
//! - `AppStoreClient` / `PlayStoreClient` - storefront verification authorities

mod document_store;
mod session_validator;
mod storefront;

pub use document_store::{Document, DocumentStore, StoreError};
pub use session_validator::SessionValidator;
pub use storefront::{AppStoreClient, PlayStoreClient, VerificationError};
