// handlers/articles/record.rs - single article CRUD on /api/v1/articles

use axum::extract::State;

use crate::api::requests::{ArticleIdQuery, CreateArticleRequest, UpdateArticleRequest};
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::{ValidJson, ValidQuery};

/// POST /api/v1/articles - Store a new article
///
/// Expected Input:
/// ```json
/// {
///   "article_info": {
///     "title": "string",
///     "content": "string",
///     "url": "string",
///     "date": "YYYY-MM-DD",
///     "keywords": ["string"]      // Optional
///   }
/// }
/// ```
///
/// Success payload: `{"article_id": "<store id>"}`
pub async fn post(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateArticleRequest>,
) -> Envelope {
    state.articles.create_article(request.article_info).await
}

/// PUT /api/v1/articles - Merge fields into an existing article
///
/// Expected Input:
/// ```json
/// {
///   "article_id": "string",
///   "article_info": { "title": "string" }   // Any subset of article fields
/// }
/// ```
pub async fn put(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateArticleRequest>,
) -> Envelope {
    state
        .articles
        .update_article(&request.article_id, request.article_info)
        .await
}

/// DELETE /api/v1/articles?article_id=
pub async fn delete(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ArticleIdQuery>,
) -> Envelope {
    state.articles.delete_article(&query.article_id).await
}

/// GET /api/v1/articles?article_id= - Success payload: `{"article_info": {...}}`
pub async fn get(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ArticleIdQuery>,
) -> Envelope {
    state.articles.get_article(&query.article_id).await
}
