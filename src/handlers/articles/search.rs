// handlers/articles/search.rs - web search and language model endpoints
//
// These call external services; their failures come back as 424.

use axum::extract::State;

use crate::api::requests::{
    GetCategoriesRequest, GetKeywordsRequest, GetRecommendationsRequest, SearchArticlesRequest,
};
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::ValidJson;

/// POST /api/v1/articles/search - Find news articles for a keyword partition
///
/// Expected Input:
/// ```json
/// {
///   "important_keywords": ["string"],
///   "relevant_keywords": ["string"],
///   "irrelevant_keywords": ["string"],
///   "language": "string",
///   "min_keywords": 2,
///   "num_results": 5,          // 1..=10
///   "date": "YYYY-MM-DD"       // Only articles published after this date
/// }
/// ```
///
/// Success payload: `{"articles": [{title, content, url, date, keywords}]}`
pub async fn search(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SearchArticlesRequest>,
) -> Envelope {
    state.articles.handle_article_search(&request).await
}

/// POST /api/v1/articles/recommendation
///
/// Expected Input:
/// ```json
/// { "keywords": ["string"], "language": "string", "date": "YYYY-MM-DD" }
/// ```
pub async fn recommendation(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<GetRecommendationsRequest>,
) -> Envelope {
    state.articles.handle_recommendation_search(&request).await
}

/// POST /api/v1/articles/keywords - Extract keywords from free text
///
/// Expected Input: `{"user_input": "string", "language": "string"}`
pub async fn keywords(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<GetKeywordsRequest>,
) -> Envelope {
    state.articles.handle_keywords_generation(&request).await
}

/// POST /api/v1/articles/categories - Group keywords into categories
///
/// Expected Input: `{"keywords": ["string"]}`
///
/// Success payload: `{"categories": {"<category>": ["keyword"]}}`
pub async fn categories(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<GetCategoriesRequest>,
) -> Envelope {
    state.articles.handle_keywords_categorization(&request).await
}
