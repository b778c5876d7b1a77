//! Test doubles for the store and the content helpers, shared by unit
//! tests and the integration suite.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::content::{ContentError, ContentHelpers, LanguageModel, Prompt, SearchHit, WebSearch};
use crate::models::{Document, User};
use crate::store::{DocumentStore, MemoryStore, StoreError, StoredDocument};

/// Language model that answers every prompt with a fixed reply
#[derive(Debug, Default)]
pub struct StubLanguageModel {
    reply: Option<String>,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubLanguageModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the API were unreachable
    pub fn failing() -> Self {
        Self::default()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for StubLanguageModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.reply.clone().ok_or_else(|| ContentError::Unavailable {
            service: crate::content::LANGUAGE_MODEL,
            detail: "stub model is offline".to_string(),
        })
    }
}

/// Web search returning canned hits, recording `(query, max_results)`
#[derive(Debug)]
pub struct StubWebSearch {
    hits: Option<Vec<SearchHit>>,
    queries: Mutex<Vec<(String, u32)>>,
}

impl Default for StubWebSearch {
    fn default() -> Self {
        Self::returning(Vec::new())
    }
}

impl StubWebSearch {
    pub fn returning(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: Some(hits),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, u32)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearch for StubWebSearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>, ContentError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.to_string(), max_results));
        }
        match &self.hits {
            Some(hits) => Ok(hits.iter().take(max_results as usize).cloned().collect()),
            None => Err(ContentError::Rejected {
                service: crate::content::WEB_SEARCH,
                status: 429,
                body: "quota exceeded".to_string(),
            }),
        }
    }
}

/// Store whose every call fails like an unreachable cluster
#[derive(Debug, Default)]
pub struct FailingStore;

fn outage() -> StoreError {
    StoreError::Backend {
        status: 503,
        body: "connection refused".to_string(),
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _: &str, _: Option<&str>, _: Document) -> Result<String, StoreError> {
        Err(outage())
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
        Err(outage())
    }

    async fn update(&self, _: &str, _: &str, _: Document, _: bool) -> Result<(), StoreError> {
        Err(outage())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(outage())
    }

    async fn list(&self, _: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Err(outage())
    }

    async fn find_by_field(&self, _: &str, _: &str, _: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Err(outage())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(outage())
    }
}

/// A valid user whose password is `secret`
pub fn sample_user(username: &str) -> User {
    User {
        username: username.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Pop".to_string(),
        birthday: "1999-04-12".to_string(),
        location: "Cluj".to_string(),
        interests: vec!["politics".to_string(), "tennis".to_string()],
        viewed_articles: Vec::new(),
        liked_articles: Vec::new(),
        is_admin: false,
        password: "secret".to_string(),
    }
}

pub fn sample_hit(title: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        snippet: format!("Snippet for {}", title),
        url: format!("https://news.example.com/{}", title.to_lowercase().replace(' ', "-")),
        published: None,
    }
}

/// Router over an in-memory store with stubbed content helpers
pub fn test_app(llm: StubLanguageModel, search: StubWebSearch) -> axum::Router {
    test_app_with_store(Arc::new(MemoryStore::new()), llm, search)
}

pub fn test_app_with_store(
    store: Arc<dyn DocumentStore>,
    llm: StubLanguageModel,
    search: StubWebSearch,
) -> axum::Router {
    let config = AppConfig::for_tests();
    let content = ContentHelpers::new(Arc::new(llm), Arc::new(search));
    app(AppState::with_parts(&config, store, content), &config)
}
