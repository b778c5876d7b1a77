use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::{error, info};

use super::{failed, EntityService};
use crate::api::requests::{
    GetCategoriesRequest, GetKeywordsRequest, GetRecommendationsRequest, SearchArticlesRequest,
};
use crate::api::Envelope;
use crate::content::{ContentError, ContentHelpers, SearchHit};
use crate::error::ApiError;
use crate::models::{to_document, Article, ArticlePatch, EntityKind};

const ARTICLES: &str = "articles";
const KEYWORDS: &str = "keywords";
const CATEGORIES: &str = "categories";

/// Restrict a search query to results published after `date`
fn with_date_filter(query: &str, date: &str) -> String {
    format!("{} after:{}", query, date)
}

/// Turn web search hits into articles carrying the caller's keywords.
/// Hits without a publication date are stamped with `today`.
fn articles_from_hits(hits: Vec<SearchHit>, keywords: &[String], today: NaiveDate) -> Vec<Article> {
    hits.into_iter()
        .map(|hit| Article {
            title: hit.title,
            content: hit.snippet,
            url: hit.url,
            date: hit.published.unwrap_or(today).format("%Y-%m-%d").to_string(),
            keywords: keywords.to_vec(),
        })
        .collect()
}

fn content_failure(err: ContentError, payload_key: &str) -> Envelope {
    failed(ApiError::from(err), Some(payload_key.to_string()))
}

/// Article endpoints: CRUD pass-throughs plus the search, recommendation
/// and keyword flows backed by the content helpers.
pub struct ArticleService {
    entities: Arc<EntityService>,
    content: ContentHelpers,
    recommendation_results: u32,
}

impl ArticleService {
    pub fn new(entities: Arc<EntityService>, content: ContentHelpers, recommendation_results: u32) -> Self {
        Self {
            entities,
            content,
            recommendation_results,
        }
    }

    pub async fn create_article(&self, article: Article) -> Envelope {
        match to_document(&article) {
            Ok(fields) => self.entities.create(EntityKind::Article, None, fields).await,
            Err(e) => failed(
                ApiError::internal_server_error(format!("Invalid article document: {}", e)),
                Some(EntityKind::Article.id_key()),
            ),
        }
    }

    pub async fn update_article(&self, article_id: &str, patch: ArticlePatch) -> Envelope {
        match to_document(&patch) {
            Ok(fields) => self.entities.update(EntityKind::Article, article_id, fields).await,
            Err(e) => failed(
                ApiError::internal_server_error(format!("Invalid article document: {}", e)),
                None,
            ),
        }
    }

    pub async fn delete_article(&self, article_id: &str) -> Envelope {
        self.entities.delete(EntityKind::Article, article_id).await
    }

    pub async fn get_article(&self, article_id: &str) -> Envelope {
        self.entities.get(EntityKind::Article, article_id).await
    }

    pub async fn get_all_articles(&self) -> Envelope {
        self.entities.get_all(EntityKind::Article).await
    }

    pub async fn get_articles_from_list(&self, ids: &[String]) -> Envelope {
        self.entities.get_all_from_list(EntityKind::Article, ids).await
    }

    pub async fn find_by_title(&self, title: &str) -> Envelope {
        self.entities.find_by_title(title).await
    }

    /// Synthesize a query from the keyword partition, restrict it to
    /// `date`, search the web and return the hits as articles.
    pub async fn handle_article_search(&self, request: &SearchArticlesRequest) -> Envelope {
        let query = match self
            .content
            .synthesize_search_query(
                &request.important_keywords,
                &request.relevant_keywords,
                &request.irrelevant_keywords,
                &request.language,
                request.min_keywords,
            )
            .await
        {
            Ok(query) => with_date_filter(&query, &request.date),
            Err(err) => return content_failure(err, ARTICLES),
        };

        let keywords: Vec<String> = request
            .important_keywords
            .iter()
            .chain(&request.relevant_keywords)
            .cloned()
            .collect();
        self.search_articles(&query, request.num_results, &keywords).await
    }

    pub async fn handle_recommendation_search(&self, request: &GetRecommendationsRequest) -> Envelope {
        let query = match self
            .content
            .synthesize_recommendation_query(&request.keywords, &request.language)
            .await
        {
            Ok(query) => with_date_filter(&query, &request.date),
            Err(err) => return content_failure(err, ARTICLES),
        };

        self.search_articles(&query, self.recommendation_results, &request.keywords)
            .await
    }

    async fn search_articles(&self, query: &str, max_results: u32, keywords: &[String]) -> Envelope {
        info!("Searching articles with query: {}", query);
        let hits = match self.content.run_web_search(query, max_results).await {
            Ok(hits) => hits,
            Err(err) => return content_failure(err, ARTICLES),
        };

        let articles = articles_from_hits(hits, keywords, Local::now().date_naive());
        match serde_json::to_value(&articles) {
            Ok(value) => {
                info!("Found {} articles", articles.len());
                Envelope::success("Successfully retrieved articles").with(ARTICLES, value)
            }
            Err(e) => {
                error!("Failed to serialize articles: {}", e);
                failed(ApiError::internal_server_error(e.to_string()), Some(ARTICLES.to_string()))
            }
        }
    }

    pub async fn handle_keywords_generation(&self, request: &GetKeywordsRequest) -> Envelope {
        match self
            .content
            .extract_keywords(&request.user_input, &request.language)
            .await
        {
            Ok(keywords) => {
                info!("Generated {} keywords", keywords.len());
                Envelope::success("Successfully generated keywords").with(KEYWORDS, json!(keywords))
            }
            Err(err) => content_failure(err, KEYWORDS),
        }
    }

    pub async fn handle_keywords_categorization(&self, request: &GetCategoriesRequest) -> Envelope {
        match self.content.categorize(&request.keywords).await {
            Ok(categories) => {
                info!("Sorted keywords into {} categories", categories.len());
                Envelope::success("Successfully categorized keywords")
                    .with(CATEGORIES, json!(categories))
            }
            Err(err) => content_failure(err, CATEGORIES),
        }
    }
}
