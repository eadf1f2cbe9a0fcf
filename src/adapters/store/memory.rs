//! In-memory document store.
//!
//! Backs tests and local development. Documents keep insertion order per
//! collection, which is the "storage-defined" order `get_many` exposes; the
//! merge counter lets tests assert idempotence (no redundant writes).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{Document, DocumentStore, StoreError};

/// In-memory `DocumentStore` with insertion-ordered collections.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<(String, Document)>>>,
    merge_count: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document wholesale, bypassing the merge counter.
    /// Test setup only.
    pub fn seed(&self, collection: &str, id: &str, doc: Document) {
        let mut collections = self.collections.lock().unwrap();
        let entries = collections.entry(collection.to_string()).or_default();
        match entries.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, existing_doc)) => *existing_doc = doc,
            None => entries.push((id.to_string(), doc)),
        }
    }

    /// Number of merge operations performed since construction.
    pub fn merge_count(&self) -> usize {
        self.merge_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.iter().find(|(existing, _)| existing == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        // Insertion order, not request order: callers must not rely on the
        // order of `ids`.
        Ok(entries
            .iter()
            .filter(|(id, _)| ids.iter().any(|wanted| wanted == id))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        self.merge_count.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.lock().unwrap();
        let entries = collections.entry(collection.to_string()).or_default();
        match entries.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, doc)) => {
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
            None => entries.push((id.to_string(), fields)),
        }
        Ok(())
    }
}
