//! Seam between the roster and the document store backing it.
//!
//! The roster only ever sees whole [`Document`]s addressed by a collection
//! name and a string key. Keys of new documents are chosen by the store.

use bson::{Bson, Document};
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("document '{key}' not found in '{collection}'")]
    NotFound { collection: String, key: String },
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Every document of a collection with its key, in store iteration order.
    async fn get_all(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Inserts a document under a store-generated key and returns the key.
    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Creates or fully replaces the document stored under `key`.
    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError>;

    /// Overwrites a single top level field. Fails with [`StoreError::NotFound`]
    /// when the document doesn't exist.
    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Bson,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}

/// Store selected by configuration at startup.
pub enum AnyStore {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl DocumentStore for AnyStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        match self {
            AnyStore::Mongo(s) => s.get_all(collection).await,
            AnyStore::Memory(s) => s.get_all(collection).await,
        }
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        match self {
            AnyStore::Mongo(s) => s.get(collection, key).await,
            AnyStore::Memory(s) => s.get(collection, key).await,
        }
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        match self {
            AnyStore::Mongo(s) => s.add(collection, document).await,
            AnyStore::Memory(s) => s.add(collection, document).await,
        }
    }

    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        match self {
            AnyStore::Mongo(s) => s.set(collection, key, document).await,
            AnyStore::Memory(s) => s.set(collection, key, document).await,
        }
    }

    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Bson,
    ) -> Result<(), StoreError> {
        match self {
            AnyStore::Mongo(s) => s.update_field(collection, key, field, value).await,
            AnyStore::Memory(s) => s.update_field(collection, key, field, value).await,
        }
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Mongo(s) => s.delete(collection, key).await,
            AnyStore::Memory(s) => s.delete(collection, key).await,
        }
    }
}

impl From<MongoStore> for AnyStore {
    fn from(store: MongoStore) -> Self {
        AnyStore::Mongo(store)
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}
