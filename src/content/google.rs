use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{ContentError, SearchHit, WebSearch, WEB_SEARCH};
use crate::config::SearchConfig;

/// Google Custom Search never returns more than this many items per page
pub const GOOGLE_MAX_RESULTS: u32 = 10;

/// Metatags that carry a publication timestamp, in preference order
const PUBLISHED_TAGS: [&str; 3] = ["article:published_time", "og:published_time", "date"];

/// Google Programmable Search (Custom Search JSON API) client
pub struct GoogleSearchClient {
    url: String,
    api_key: Option<String>,
    engine_id: Option<String>,
    client: Client,
}

impl GoogleSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
            client,
        })
    }
}

fn unavailable(err: reqwest::Error) -> ContentError {
    ContentError::Unavailable {
        service: WEB_SEARCH,
        detail: err.to_string(),
    }
}

/// `items[*]` of a search response. Google omits `items` when nothing
/// matched, which is an empty result rather than a failure.
fn parse_items(body: &Value) -> Vec<SearchHit> {
    let Some(items) = body.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let url = item.get("link")?.as_str()?.to_string();
            let text = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Some(SearchHit {
                title: text("title"),
                snippet: text("snippet"),
                url,
                published: published_date(item),
            })
        })
        .collect()
}

fn published_date(item: &Value) -> Option<NaiveDate> {
    let metatags = item.pointer("/pagemap/metatags")?.as_array()?;
    metatags.iter().find_map(|tags| {
        PUBLISHED_TAGS.iter().find_map(|tag| {
            let stamp = tags.get(*tag)?.as_str()?;
            NaiveDate::parse_from_str(stamp.get(..10)?, "%Y-%m-%d").ok()
        })
    })
}

#[async_trait]
impl WebSearch for GoogleSearchClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>, ContentError> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.engine_id.as_deref()) else {
            return Err(ContentError::Unavailable {
                service: WEB_SEARCH,
                detail: "GOOGLE_API_KEY and GOOGLE_ENGINE_ID must be set".to_string(),
            });
        };

        let num = max_results.clamp(1, GOOGLE_MAX_RESULTS).to_string();
        debug!("Web search for {:?} (num={})", query, num);

        let response = self
            .client
            .get(&self.url)
            .query(&[("key", key), ("cx", cx), ("q", query), ("num", num.as_str())])
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Rejected {
                service: WEB_SEARCH,
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| ContentError::Malformed {
            service: WEB_SEARCH,
            detail: e.to_string(),
        })?;
        Ok(parse_items(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    #[test]
    fn parses_items_and_publication_dates() {
        let body = json!({
            "items": [
                {
                    "title": "Rust 2.0 announced",
                    "snippet": "The Rust team...",
                    "link": "https://example.com/rust",
                    "pagemap": {"metatags": [{"article:published_time": "2024-05-01T10:00:00Z"}]}
                },
                {
                    "title": "No date here",
                    "link": "https://example.com/nodate"
                },
                {
                    "title": "Missing link is skipped"
                }
            ]
        });

        let hits = parse_items(&body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com/rust");
        assert_eq!(hits[0].published, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(hits[1].snippet, "");
        assert_eq!(hits[1].published, None);
    }

    #[test]
    fn no_items_means_no_results() {
        assert!(parse_items(&json!({"searchInformation": {"totalResults": "0"}})).is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_are_unavailable() {
        let mut config = AppConfig::for_tests().search;
        config.api_key = None;
        let client = GoogleSearchClient::new(&config).unwrap();

        let err = client.search("rust", 5).await.unwrap_err();
        assert!(matches!(err, ContentError::Unavailable { .. }));
    }
}
