//! In-memory store implementations for tests and local runs.

use crate::document::{DocumentStore, Record};
use crate::error::StoreError;
use crate::object::ObjectStore;
use async_trait::async_trait;
use std::collections::HashMap;
use parking_lot::Mutex;

/// [`DocumentStore`] over an in-memory collection map.
///
/// Unknown collections yield an empty result, mirroring a reachable store
/// with no matching documents.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: HashMap<String, Vec<Record>>,
}

impl MemoryDocumentStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one pre-populated collection.
    #[must_use]
    pub fn with_collection(name: impl Into<String>, records: Vec<Record>) -> Self {
        let mut store = Self::new();
        store.insert(name, records);
        store
    }

    /// Add or replace a collection.
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<Record>) {
        self.collections.insert(name.into(), records);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}

/// [`ObjectStore`] over an in-memory key/bytes map.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bytes under `key`, if any. Test observer; not part of the
    /// [`ObjectStore`] contract.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Whether no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.objects
            .lock()
            .insert(key.to_string(), bytes);
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .objects
            .lock()
            .contains_key(key))
    }
}
