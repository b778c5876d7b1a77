pub mod elasticsearch;
pub mod memory;

pub use elasticsearch::ElasticsearchStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::Document;

/// Errors from a DocumentStore
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document {id} not found")]
    NotFound { collection: String, id: String },

    #[error("{collection} document {id} already exists")]
    Conflict { collection: String, id: String },

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Store returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Unexpected store response: {0}")]
    Decode(String),

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(collection: &str, id: &str) -> Self {
        StoreError::Conflict {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// True when the document was absent rather than the store failing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A document together with the id the store keeps it under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub source: Document,
}

/// Key/document store addressed by collection and document id.
///
/// Absence is reported explicitly (`Ok(None)` from `get`,
/// `StoreError::NotFound` from `update`/`delete`) so callers never have to
/// guess it from the shape of a transport error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. With `id` the document is created under that
    /// key and an existing document yields `StoreError::Conflict`; without
    /// it the store assigns one. Returns the document id.
    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into the stored document. When the document is
    /// missing it is created from `fields` if `upsert` is set, otherwise
    /// `StoreError::NotFound` is returned.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        upsert: bool,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Every document of the collection in store order
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Documents whose string `field` equals `value` exactly
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}
