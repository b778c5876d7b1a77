//! External content helpers: query synthesis, keyword extraction and
//! categorisation through a language model, article discovery through a
//! web search engine.

pub mod google;
pub mod openai;
pub mod prompts;

pub use google::GoogleSearchClient;
pub use openai::OpenAiClient;
pub use prompts::Prompt;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a content helper produced no usable result. An empty result set is
/// not an error; these variants all mean the dependency failed.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{service} unavailable: {detail}")]
    Unavailable { service: &'static str, detail: String },

    #[error("{service} rejected the request with HTTP {status}: {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unusable response: {detail}")]
    Malformed { service: &'static str, detail: String },
}

pub const LANGUAGE_MODEL: &str = "language model";
pub const WEB_SEARCH: &str = "web search";

/// One web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// Publication date when the result page advertises one
    #[serde(default)]
    pub published: Option<NaiveDate>,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single system + user exchange and return the reply text
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError>;
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>, ContentError>;
}

/// The helper functions the search, recommendation and keyword endpoints
/// call. Each helper does exactly one round trip.
#[derive(Clone)]
pub struct ContentHelpers {
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn WebSearch>,
}

impl ContentHelpers {
    pub fn new(llm: Arc<dyn LanguageModel>, search: Arc<dyn WebSearch>) -> Self {
        Self { llm, search }
    }

    pub async fn synthesize_search_query(
        &self,
        important: &[String],
        relevant: &[String],
        irrelevant: &[String],
        language: &str,
        min_keywords: u32,
    ) -> Result<String, ContentError> {
        let prompt = prompts::search_query(important, relevant, irrelevant, language, min_keywords);
        let reply = self.llm.complete(&prompt).await?;
        clean_query(&reply)
    }

    pub async fn synthesize_recommendation_query(
        &self,
        keywords: &[String],
        language: &str,
    ) -> Result<String, ContentError> {
        let prompt = prompts::recommendation_query(keywords, language);
        let reply = self.llm.complete(&prompt).await?;
        clean_query(&reply)
    }

    pub async fn run_web_search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, ContentError> {
        self.search.search(query, max_results).await
    }

    pub async fn extract_keywords(
        &self,
        free_text: &str,
        language: &str,
    ) -> Result<Vec<String>, ContentError> {
        let prompt = prompts::keywords(free_text, language);
        let reply = self.llm.complete(&prompt).await?;
        Ok(parse_keyword_list(&reply))
    }

    pub async fn categorize(
        &self,
        keywords: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, ContentError> {
        let prompt = prompts::categories(keywords);
        let reply = self.llm.complete(&prompt).await?;
        parse_categories(&reply)
    }
}

/// Strip the quoting models like to wrap a bare query in
fn clean_query(reply: &str) -> Result<String, ContentError> {
    let query = reply
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();

    if query.is_empty() {
        return Err(ContentError::Malformed {
            service: LANGUAGE_MODEL,
            detail: "empty search query".to_string(),
        });
    }
    Ok(query.to_string())
}

/// Comma or newline separated keywords, trimmed and de-duplicated in order
fn parse_keyword_list(reply: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for raw in reply.split(|c| c == ',' || c == '\n') {
        let keyword = raw
            .trim()
            .trim_start_matches(|c: char| c == '-' || c == '*')
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

/// JSON object of category -> keywords, possibly inside a ```json fence
fn parse_categories(reply: &str) -> Result<BTreeMap<String, Vec<String>>, ContentError> {
    let malformed = |detail: String| ContentError::Malformed {
        service: LANGUAGE_MODEL,
        detail,
    };

    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(malformed(format!("no JSON object in reply: {}", reply))),
    };

    serde_json::from_str(json).map_err(|e| malformed(format!("invalid categories JSON: {}", e)))
}
