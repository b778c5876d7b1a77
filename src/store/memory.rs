use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, StoreError, StoredDocument};
use crate::models::Document;

#[derive(Debug, Default)]
struct Collection {
    /// Insertion order of live ids
    order: Vec<String>,
    documents: HashMap<String, Document>,
}

impl Collection {
    fn put(&mut self, id: String, document: Document) {
        if !self.documents.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.documents.insert(id, document);
    }

    fn iter(&self) -> impl Iterator<Item = StoredDocument> + '_ {
        self.order.iter().filter_map(|id| {
            self.documents.get(id).map(|source| StoredDocument {
                id: id.clone(),
                source: source.clone(),
            })
        })
    }
}

/// Process-local DocumentStore. Used for development without Elasticsearch
/// and as the store behind the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();

        let id = match id {
            Some(id) if entries.documents.contains_key(id) => {
                return Err(StoreError::conflict(collection, id));
            }
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };

        entries.put(id.clone(), document);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.documents.get(id))
            .cloned())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();

        match entries.documents.get_mut(id) {
            Some(existing) => {
                existing.extend(fields);
                Ok(())
            }
            None if upsert => {
                entries.put(id.to_string(), fields);
                Ok(())
            }
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if entries.documents.remove(id).is_none() {
            return Err(StoreError::not_found(collection, id));
        }
        entries.order.retain(|existing| existing != id);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entries| entries.iter().collect())
            .unwrap_or_default())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|doc| doc.source.get(field).and_then(Value::as_str) == Some(value))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
