//! Document store port - the only shared mutable resource in the system.
//!
//! All cross-invocation state lives behind this port as loosely-typed
//! documents. Mutation is exclusively via targeted field merges so that
//! concurrent writers touching different fields of the same record do not
//! clobber each other.

use async_trait::async_trait;
use thiserror::Error;

/// A document's field map.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Errors surfaced by document-store operations.
///
/// These are never retried inside the core; they propagate to the endpoint
/// boundary and are reported as internal errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document store rejected the operation: {0}")]
    Rejected(String),

    #[error("Malformed document in '{collection}/{id}': {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Key-value/document storage with snapshot reads and field-merge writes.
///
/// # Contract
///
/// - `get` returns a snapshot of the document, or `None` if absent.
/// - `get_many` is a membership lookup: it returns only the documents that
///   exist, paired with their ids, **in an order chosen by the storage
///   backend**. Callers that derive state from the result must treat that
///   order as deterministic per backend but otherwise unspecified.
/// - `merge` upserts the given fields with last-write-wins semantics and
///   leaves all other fields untouched. Merging into an absent document
///   creates it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a single document snapshot.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Read every existing document among `ids`, in storage-defined order.
    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<(String, Document)>, StoreError>;

    /// Merge fields into a document, creating it if absent.
    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError>;
}
