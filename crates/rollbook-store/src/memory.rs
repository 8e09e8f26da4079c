use std::collections::BTreeMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Document, Filter, Patch};
use crate::error::{StoreError, StoreResult};
use crate::store::EntityStore;

/// In-memory [`EntityStore`] backend.
///
/// Documents are kept as serialized JSON objects behind a `tokio` lock. The
/// lock is only held for the duration of a single operation; it is never
/// held across await points outside the store, matching the
/// no-locks-across-suspension-points contract of the core.
pub struct MemoryStore<T: Document> {
    docs: RwLock<BTreeMap<Uuid, Map<String, Value>>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            _entity: PhantomData,
        }
    }

    async fn count_matching(&self, filter: &Filter) -> u64 {
        let docs = self.docs.read().await;
        docs.values()
            .filter(|doc| is_active(doc) && filter.matches(doc))
            .count() as u64
    }
}

impl<T: Document> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_active(doc: &Map<String, Value>) -> bool {
    matches!(doc.get("deleted_at"), None | Some(Value::Null))
}

fn serialize<T: Document>(doc: &T) -> StoreResult<Map<String, Value>> {
    match serde_json::to_value(doc).map_err(StoreError::Serialize)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

fn deserialize<T: Document>(doc: &Map<String, Value>) -> StoreResult<T> {
    serde_json::from_value(Value::Object(doc.clone())).map_err(|source| StoreError::Corrupt {
        collection: T::COLLECTION,
        source,
    })
}

#[async_trait]
impl<T: Document> EntityStore<T> for MemoryStore<T> {
    async fn insert(&self, doc: T) -> StoreResult<T> {
        let serialized = serialize(&doc)?;
        self.docs.write().await.insert(doc.id(), serialized);
        Ok(doc)
    }

    async fn find_active_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        let docs = self.docs.read().await;
        match docs.get(&id) {
            Some(doc) if is_active(doc) => Ok(Some(deserialize(doc)?)),
            _ => Ok(None),
        }
    }

    async fn find_by_id_any(&self, id: Uuid) -> StoreResult<Option<T>> {
        let docs = self.docs.read().await;
        docs.get(&id).map(deserialize).transpose()
    }

    async fn find_active(&self, filter: Filter) -> StoreResult<Vec<T>> {
        let docs = self.docs.read().await;
        docs.values()
            .filter(|doc| is_active(doc) && filter.matches(doc))
            .map(deserialize)
            .collect()
    }

    async fn exists_active(&self, filter: Filter) -> StoreResult<bool> {
        Ok(self.count_matching(&filter).await > 0)
    }

    async fn count_active(&self, filter: Filter) -> StoreResult<u64> {
        Ok(self.count_matching(&filter).await)
    }

    async fn update_active_by_id(&self, id: Uuid, patch: Patch) -> StoreResult<Option<T>> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(None);
        };
        if !is_active(doc) {
            return Ok(None);
        }

        // Apply on a copy first: a patch that breaks the document schema
        // must not leave the stored document half-updated.
        let mut updated = doc.clone();
        patch.apply(&mut updated);
        updated.insert("updated_at".to_string(), timestamp());

        let entity = deserialize::<T>(&updated)?;
        *doc = updated;
        Ok(Some(entity))
    }

    async fn soft_delete_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        self.update_active_by_id(id, Patch::new().set("deleted_at", Utc::now()))
            .await
    }
}

fn timestamp() -> Value {
    serde_json::to_value(Utc::now()).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        title: String,
        body: String,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Uuid {
            self.id
        }

        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }
    }

    fn note(title: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body: "body".to_string(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find_roundtrip() {
        let store = MemoryStore::new();
        let n = store.insert(note("first")).await.unwrap();
        let found = store.find_active_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(found, n);
    }

    #[tokio::test]
    async fn update_touches_only_patched_fields() {
        let store = MemoryStore::new();
        let n = store.insert(note("first")).await.unwrap();

        let updated = store
            .update_active_by_id(n.id, Patch::new().set("title", "second"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "second");
        assert_eq!(updated.body, n.body);
        assert!(updated.updated_at >= n.updated_at);
    }

    #[tokio::test]
    async fn soft_delete_hides_from_active_queries_but_not_any_lookup() {
        let store = MemoryStore::new();
        let n = store.insert(note("first")).await.unwrap();

        let deleted = store.soft_delete_by_id(n.id).await.unwrap().unwrap();
        assert!(deleted.deleted_at.is_some());

        assert!(store.find_active_by_id(n.id).await.unwrap().is_none());
        assert!(!store.exists_active(Filter::new().eq("id", n.id)).await.unwrap());
        assert_eq!(store.count_active(Filter::new()).await.unwrap(), 0);

        // Never physically removed.
        let any = store.find_by_id_any(n.id).await.unwrap().unwrap();
        assert_eq!(any.id, n.id);
        assert!(any.deleted_at.is_some());
    }

    #[tokio::test]
    async fn update_after_soft_delete_loses_cleanly() {
        let store = MemoryStore::new();
        let n = store.insert(note("first")).await.unwrap();
        store.soft_delete_by_id(n.id).await.unwrap();

        let result = store
            .update_active_by_id(n.id, Patch::new().set("title", "second"))
            .await
            .unwrap();
        assert!(result.is_none());

        // A second delete of the same document also misses.
        assert!(store.soft_delete_by_id(n.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn schema_breaking_patch_leaves_document_unchanged() {
        let store = MemoryStore::new();
        let n = store.insert(note("first")).await.unwrap();

        let result = store
            .update_active_by_id(n.id, Patch::new().set("title", 42))
            .await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));

        let stored = store.find_active_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "first");
    }

    #[tokio::test]
    async fn count_active_applies_filter() {
        let store = MemoryStore::new();
        store.insert(note("a")).await.unwrap();
        store.insert(note("a")).await.unwrap();
        store.insert(note("b")).await.unwrap();

        let count = store
            .count_active(Filter::new().eq("title", "a"))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
