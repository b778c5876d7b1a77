// handlers/articles/list.rs - multi-article lookups

use axum::extract::State;

use crate::api::requests::{GetAllFromList, TitleQuery};
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::{ValidJson, ValidQuery};

/// GET /api/v1/articles/all
///
/// Success payload: `{"articles_info": [{..., "article_id": "..."}]}`
pub async fn all(State(state): State<AppState>) -> Envelope {
    state.articles.get_all_articles().await
}

/// POST /api/v1/articles/list - Fetch several articles by id
///
/// Expected Input:
/// ```json
/// { "ids_list": ["id1", "id2"] }
/// ```
///
/// Success payload: `{"articles_info": {"id1": {...}, "id2": {...}}}`.
/// The first id that cannot be fetched decides the response.
pub async fn from_list(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<GetAllFromList>,
) -> Envelope {
    state.articles.get_articles_from_list(&request.ids_list).await
}

/// GET /api/v1/articles/by-title?title=
pub async fn by_title(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TitleQuery>,
) -> Envelope {
    state.articles.find_by_title(&query.title).await
}
