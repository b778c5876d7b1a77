use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::{DocumentStore, StoreError, StoredDocument};
use crate::config::StoreConfig;
use crate::models::Document;

/// Upper bound on exact matches returned by a field lookup
const FIELD_SEARCH_SIZE: usize = 50;

/// How long Elasticsearch keeps a scroll context between pages
const SCROLL_KEEP_ALIVE: &str = "1m";

/// DocumentStore backed by the Elasticsearch REST API.
/// Collections map to indexes, documents to `_doc` entries.
pub struct ElasticsearchStore {
    base: Url,
    client: Client,
    refresh: bool,
    page_size: usize,
}

impl ElasticsearchStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.url).map_err(|_| StoreError::InvalidUrl(config.url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Created Elasticsearch client for: {}", base);
        Ok(Self {
            base,
            client,
            refresh: config.refresh,
            page_size: config.page_size.max(1),
        })
    }

    /// Append path segments to the base URL. Segments are percent-encoded,
    /// so ids containing `/` or spaces stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, write: bool) -> RequestBuilder {
        let builder = self.client.request(method, url);
        if write && self.refresh {
            builder.query(&[("refresh", "wait_for")])
        } else {
            builder
        }
    }

    /// Fetch the page after `scroll_id`
    async fn next_page(&self, scroll_id: &str) -> Result<Value, StoreError> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let response = self
            .request(Method::POST, url, false)
            .json(&json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": scroll_id }))
            .send()
            .await?;
        read_json(response).await
    }

    /// Release a scroll context. Failures only cost the context living
    /// until its keep-alive runs out.
    async fn clear_scroll(&self, scroll_id: &str) {
        let result = match self.endpoint(&["_search", "scroll"]) {
            Ok(url) => self
                .request(Method::DELETE, url, false)
                .json(&json!({ "scroll_id": scroll_id }))
                .send()
                .await
                .map(|_| ())
                .map_err(StoreError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            debug!("Failed to clear scroll context: {}", err);
        }
    }
}

/// First page of a full-collection scan in index order
fn list_query(page_size: usize) -> Value {
    json!({
        "query": { "match_all": {} },
        "size": page_size,
        "sort": ["_doc"]
    })
}

/// Exact match on the keyword sub-field that dynamic mapping adds to text
fn field_query(field: &str, value: &str) -> Value {
    json!({
        "query": { "term": { format!("{}.keyword", field): value } },
        "size": FIELD_SEARCH_SIZE
    })
}

/// Read a successful body as JSON, or turn the status into a Backend error
async fn read_json(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<Value>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

/// `_id` of an index/create response
fn parse_id(body: &Value) -> Result<String, StoreError> {
    body.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Decode(format!("missing _id in {}", body)))
}

/// `_source` of a get response
fn parse_source(body: &Value) -> Result<Document, StoreError> {
    match body.get("_source") {
        Some(Value::Object(source)) => Ok(source.clone()),
        _ => Err(StoreError::Decode(format!("missing _source in {}", body))),
    }
}

/// `hits.hits[*]` of a search response
fn parse_hits(body: &Value) -> Result<Vec<StoredDocument>, StoreError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Decode(format!("missing hits in {}", body)))?;

    hits.iter()
        .map(|hit| {
            Ok(StoredDocument {
                id: parse_id(hit)?,
                source: parse_source(hit)?,
            })
        })
        .collect()
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, StoreError> {
        let response = match id {
            // _create refuses to overwrite an existing document
            Some(id) => {
                let url = self.endpoint(&[collection, "_create", id])?;
                self.request(Method::PUT, url, true).json(&document).send().await?
            }
            None => {
                let url = self.endpoint(&[collection, "_doc"])?;
                self.request(Method::POST, url, true).json(&document).send().await?
            }
        };

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::conflict(collection, id.unwrap_or_default()));
        }

        let body = read_json(response).await?;
        let new_id = parse_id(&body)?;
        debug!("Indexed {} document {}", collection, new_id);
        Ok(new_id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.endpoint(&[collection, "_doc", id])?;
        let response = self.request(Method::GET, url, false).send().await?;

        // Missing document and missing index both answer 404
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = read_json(response).await?;
        parse_source(&body).map(Some)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&[collection, "_update", id])?;
        let response = self
            .request(Method::POST, url, true)
            .json(&json!({ "doc": fields, "doc_as_upsert": upsert }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(collection, id));
        }

        read_json(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&[collection, "_doc", id])?;
        let response = self.request(Method::DELETE, url, true).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(collection, id));
        }

        read_json(response).await?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let mut url = self.endpoint(&[collection, "_search"])?;
        url.query_pairs_mut().append_pair("scroll", SCROLL_KEEP_ALIVE);
        let response = self
            .request(Method::POST, url, false)
            .json(&list_query(self.page_size))
            .send()
            .await?;

        // An index that was never written to has no documents
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let mut body = read_json(response).await?;
        let mut documents = Vec::new();
        loop {
            let page = parse_hits(&body)?;
            let last_page = page.len() < self.page_size;
            documents.extend(page);

            let scroll_id = body.get("_scroll_id").and_then(Value::as_str).map(str::to_string);
            match scroll_id {
                Some(id) if last_page => {
                    self.clear_scroll(&id).await;
                    break;
                }
                Some(id) => body = self.next_page(&id).await?,
                None => break,
            }
        }

        debug!("Listed {} {} documents", documents.len(), collection);
        Ok(documents)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let url = self.endpoint(&[collection, "_search"])?;
        let response = self
            .request(Method::POST, url, false)
            .json(&field_query(field, value))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let body = read_json(response).await?;

        // Custom mappings may normalize keywords; compare against the source
        Ok(parse_hits(&body)?
            .into_iter()
            .filter(|doc| doc.source.get(field).and_then(Value::as_str) == Some(value))
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.endpoint(&["_cluster", "health"])?;
        let response = self.request(Method::GET, url, false).send().await?;
        read_json(response).await?;
        Ok(())
    }
}
