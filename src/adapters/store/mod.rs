//! Document store adapters.
//!
//! - `firestore` - Production Firestore REST implementation
//! - `memory` - In-memory implementation for tests and local runs

mod firestore;
mod memory;

pub use firestore::{FirestoreConfig, FirestoreDocumentStore};
pub use memory::InMemoryDocumentStore;
