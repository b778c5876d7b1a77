use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::api::Envelope;
use crate::config::{StoreConfig, UpdateMissingPolicy};
use crate::error::ApiError;
use crate::models::{Document, EntityKind};
use crate::store::{DocumentStore, StoreError};

use super::failed;

/// What a store call was trying to do, for failure messages
#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
    Delete,
    Retrieve,
}

impl Action {
    fn describe(self, kind: EntityKind) -> String {
        match self {
            Action::Add => format!("add a new {} into the database", kind.name()),
            Action::Update => format!("update {} in the database", kind.name()),
            Action::Delete => format!("delete {} from the database", kind.name()),
            Action::Retrieve => format!("retrieve {} from the database", kind.name()),
        }
    }
}

/// Classify a store failure for one entity: absence and duplicates get
/// their own codes, anything else is a failed dependency carrying the
/// original error text.
fn store_failure(kind: EntityKind, id: &str, action: Action, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { .. } => {
            ApiError::not_found(format!("{} with id {} not found", kind.display_name(), id))
        }
        StoreError::Conflict { .. } => {
            ApiError::conflict(format!("{} with id {} already exists", kind.display_name(), id))
        }
        other => {
            let message = format!(
                "Encountered an exception when trying to {}: {}",
                action.describe(kind),
                other
            );
            error!("{}", message);
            ApiError::failed_dependency(message)
        }
    }
}

/// Uniform CRUD over articles and users.
///
/// Every operation answers with an [`Envelope`]; store failures never
/// escape as errors.
pub struct EntityService {
    store: Arc<dyn DocumentStore>,
    update_missing: UpdateMissingPolicy,
}

impl EntityService {
    pub fn new(store: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self {
            store,
            update_missing: config.update_missing,
        }
    }

    /// Store a new document. `id` is only given for users (the username).
    pub async fn create(&self, kind: EntityKind, id: Option<&str>, fields: Document) -> Envelope {
        let id_key = kind.id_key();
        match self.store.insert(kind.collection(), id, fields).await {
            Ok(id) => {
                info!("Added {} {} in the database", kind.name(), id);
                Envelope::success(format!("Successfully added {} into the database", kind.name()))
                    .with(id_key, json!(id))
            }
            Err(err) => failed(
                store_failure(kind, id.unwrap_or_default(), Action::Add, err),
                Some(id_key),
            ),
        }
    }

    /// Merge `fields` into an existing document
    pub async fn update(&self, kind: EntityKind, id: &str, fields: Document) -> Envelope {
        debug!("Updating {} {} with {:?}", kind.name(), id, fields);
        let upsert = self.update_missing.upsert();
        match self.store.update(kind.collection(), id, fields, upsert).await {
            Ok(()) => {
                info!("Updated {} {} in the database", kind.name(), id);
                Envelope::success(format!("Successfully updated {} in the database", kind.name()))
            }
            Err(err) => failed(store_failure(kind, id, Action::Update, err), None),
        }
    }

    pub async fn delete(&self, kind: EntityKind, id: &str) -> Envelope {
        match self.store.delete(kind.collection(), id).await {
            Ok(()) => {
                info!("Deleted {} {} from the database", kind.name(), id);
                Envelope::success(format!("Successfully deleted {} from the database", kind.name()))
            }
            Err(err) => failed(store_failure(kind, id, Action::Delete, err), None),
        }
    }

    /// Fetch one document's fields, or the classified failure
    pub async fn fetch(&self, kind: EntityKind, id: &str) -> Result<Document, ApiError> {
        match self.store.get(kind.collection(), id).await {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Err(store_failure(
                kind,
                id,
                Action::Retrieve,
                StoreError::not_found(kind.collection(), id),
            )),
            Err(err) => Err(store_failure(kind, id, Action::Retrieve, err)),
        }
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Envelope {
        let info_key = kind.info_key();
        match self.fetch(kind, id).await {
            Ok(document) => {
                info!("Retrieved {} {} from the database", kind.name(), id);
                Envelope::success(format!("Successfully retrieved {} from the database", kind.name()))
                    .with(info_key, Value::Object(document))
            }
            Err(err) => failed(err, Some(info_key)),
        }
    }

    /// Every document of the kind, each tagged with its `{kind}_id`
    pub async fn get_all(&self, kind: EntityKind) -> Envelope {
        let collection_key = kind.collection_key();
        let documents = match self.store.list(kind.collection()).await {
            Ok(documents) => documents,
            Err(err) => {
                let message = format!(
                    "Encountered exception when tried to retrieve {} from the database: {}",
                    kind.collection(),
                    err
                );
                error!("{}", message);
                return failed(ApiError::failed_dependency(message), Some(collection_key));
            }
        };

        let tagged: Vec<Value> = documents
            .into_iter()
            .map(|stored| {
                let mut source = stored.source;
                source.insert(kind.id_key(), Value::String(stored.id));
                Value::Object(source)
            })
            .collect();

        info!("Retrieved {} {} from the database", tagged.len(), kind.collection());
        Envelope::success(format!("Successfully retrieved {} from the database", kind.collection()))
            .with(collection_key, Value::Array(tagged))
    }

    /// Map of id to fields for the requested ids. Fetches run one at a time
    /// in input order; the first failure becomes the whole response.
    pub async fn get_all_from_list(&self, kind: EntityKind, ids: &[String]) -> Envelope {
        let collection_key = kind.collection_key();
        let mut found = Map::new();

        for id in ids {
            match self.fetch(kind, id).await {
                Ok(document) => {
                    found.insert(id.clone(), Value::Object(document));
                }
                Err(err) => return failed(err, Some(collection_key)),
            }
        }

        debug!("Resolved {} {} from list", found.len(), kind.collection());
        Envelope::success(format!(
            "Successfully retrieved information about requested {}",
            kind.collection()
        ))
        .with(collection_key, Value::Object(found))
    }

    /// First article whose title matches exactly
    pub async fn find_by_title(&self, title: &str) -> Envelope {
        let kind = EntityKind::Article;
        let (id_key, info_key) = (kind.id_key(), kind.info_key());
        let not_found = || {
            failed(
                ApiError::not_found(format!("Article with title {} not found", title)),
                Some(info_key.clone()),
            )
            .with(id_key.clone(), Value::Null)
        };

        match self.store.find_by_field(kind.collection(), "title", title).await {
            Ok(matches) => match matches.into_iter().next() {
                Some(stored) => Envelope::success("Successfully retrieved article from the database")
                    .with(id_key.clone(), Value::String(stored.id))
                    .with(info_key.clone(), Value::Object(stored.source)),
                None => not_found(),
            },
            Err(err) => failed(store_failure(kind, title, Action::Retrieve, err), Some(info_key.clone()))
                .with(id_key.clone(), Value::Null),
        }
    }

    /// Store connectivity for the health endpoint
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
