use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use bson::{Bson, Document};
use uuid::Uuid;

use super::{DocumentStore, StoreError};

type Collections = HashMap<String, Vec<(String, Document)>>;

/// Process local document store.
///
/// Collections keep insertion order. Clones share the same storage, which
/// lets tests hold on to a handle while the roster owns another one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    storage: Arc<RwLock<Collections>>,
    unavailable: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with [`StoreError::Unavailable`]
    /// until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful writes (add, set, update, delete) so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of successful reads (get and get_all) so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        } else {
            Ok(())
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> Result<T, StoreError> {
        self.check_available()?;
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(f(&storage))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.check_available()?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let result = f(&mut storage)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(result)
    }
}

impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.read(|storage| storage.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.read(|storage| {
            storage
                .get(collection)
                .and_then(|docs| docs.iter().find(|(k, _)| k == key))
                .map(|(_, doc)| doc.clone())
        })
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        self.write(|storage| {
            let key = Uuid::new_v4().to_string();
            storage
                .entry(collection.to_string())
                .or_default()
                .push((key.clone(), document));
            Ok(key)
        })
    }

    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        self.write(|storage| {
            let docs = storage.entry(collection.to_string()).or_default();
            match docs.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = document,
                None => docs.push((key.to_string(), document)),
            }
            Ok(())
        })
    }

    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Bson,
    ) -> Result<(), StoreError> {
        self.write(|storage| {
            let existing = storage
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|(k, _)| k == key))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    key: key.to_string(),
                })?;
            existing.1.insert(field, value);
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.write(|storage| {
            if let Some(docs) = storage.get_mut(collection) {
                docs.retain(|(k, _)| k != key);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let store = MemoryStore::new();
        let a = store.add("classes", doc! { "name": "A" }).await.unwrap();
        let b = store.add("classes", doc! { "name": "B" }).await.unwrap();
        store.set("classes", &a, doc! { "name": "A2" }).await.unwrap();

        let all = store.get_all("classes").await.unwrap();
        let keys: Vec<_> = all.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![a, b]);
        assert_eq!(all[0].1.get_str("name").unwrap(), "A2");
    }

    #[tokio::test]
    async fn update_missing_document() {
        let store = MemoryStore::new();
        let result = store
            .update_field("classes", "nope", "students", Bson::Array(vec![]))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn switched_off_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get_all("classes").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.add("classes", doc! {}).await.is_err());

        store.set_unavailable(false);
        assert!(store.get_all("classes").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("classes", "k", doc! { "name": "A" }).await.unwrap();
        assert!(handle.get("classes", "k").await.unwrap().is_some());
        assert_eq!(handle.writes(), 1);
    }
}
