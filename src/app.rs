use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::Envelope;
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::content::{ContentHelpers, GoogleSearchClient, OpenAiClient};
use crate::handlers::{articles, users};
use crate::services::{ArticleService, EntityService, UserService};
use crate::store::{DocumentStore, ElasticsearchStore, MemoryStore};

/// Shared handler state. Services are behind `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub entities: Arc<EntityService>,
    pub articles: Arc<ArticleService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// Build the store and content clients named by the configuration
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Elasticsearch => Arc::new(
                ElasticsearchStore::new(&config.store).context("failed to create Elasticsearch client")?,
            ),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; documents are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let llm = OpenAiClient::new(&config.llm).context("failed to create language model client")?;
        let search = GoogleSearchClient::new(&config.search).context("failed to create web search client")?;
        if config.llm.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; keyword and search endpoints will answer 424");
        }

        let content = ContentHelpers::new(Arc::new(llm), Arc::new(search));
        Ok(Self::with_parts(config, store, content))
    }

    pub fn with_parts(config: &AppConfig, store: Arc<dyn DocumentStore>, content: ContentHelpers) -> Self {
        let entities = Arc::new(EntityService::new(store, &config.store));
        let articles = Arc::new(ArticleService::new(
            entities.clone(),
            content,
            config.search.max_results,
        ));
        let users = Arc::new(UserService::new(entities.clone(), config.security.bcrypt_cost));

        Self {
            entities,
            articles,
            users,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", Router::new().merge(article_routes()).merge(user_routes()))
        .with_state(state);

    // Global middleware
    let router = match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

fn article_routes() -> Router<AppState> {
    Router::new()
        // Single article by id
        .route(
            "/articles",
            get(articles::article_get)
                .post(articles::article_post)
                .put(articles::article_put)
                .delete(articles::article_delete),
        )
        .route("/articles/all", get(articles::articles_all))
        .route("/articles/list", post(articles::articles_list))
        .route("/articles/by-title", get(articles::article_by_title))
        // Web search and language model helpers
        .route("/articles/search", post(articles::articles_search))
        .route("/articles/recommendation", post(articles::articles_recommendation))
        .route("/articles/keywords", post(articles::keywords_post))
        .route("/articles/categories", post(articles::categories_post))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::user_get)
                .post(users::user_post)
                .put(users::user_put)
                .delete(users::user_delete),
        )
        .route("/users/all", get(users::users_all))
        .route("/users/list", post(users::users_list))
        .route("/users/login", post(users::login_post).get(users::login_get))
}

async fn root() -> Envelope {
    Envelope::success("EchoFeed API")
        .with("name", json!("EchoFeed API"))
        .with("version", json!(env!("CARGO_PKG_VERSION")))
        .with(
            "description",
            json!("News aggregation backend: articles, users, web search and keyword helpers"),
        )
        .with(
            "endpoints",
            json!({
                "health": "/health",
                "articles": "/api/v1/articles[/all|/list|/by-title]",
                "search": "/api/v1/articles/search, /api/v1/articles/recommendation",
                "keywords": "/api/v1/articles/keywords, /api/v1/articles/categories",
                "users": "/api/v1/users[/all|/list]",
                "login": "/api/v1/users/login",
            }),
        )
}

async fn health(State(state): State<AppState>) -> Envelope {
    let now = chrono::Utc::now();

    match state.entities.ping().await {
        Ok(()) => Envelope::success("ok")
            .with("status", json!("ok"))
            .with("timestamp", json!(now))
            .with("store", json!("ok")),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Envelope::failure(503, "store unavailable")
                .with("status", json!("degraded"))
                .with("timestamp", json!(now))
                .with("store_error", json!(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_app, test_app_with_store, FailingStore, StubLanguageModel, StubWebSearch};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Envelope) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn stub_app() -> Router {
        test_app(StubLanguageModel::replying("q"), StubWebSearch::default())
    }

    #[tokio::test]
    async fn health_reflects_store() {
        let request = || Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(stub_app(), request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("store"), Some(&json!("ok")));

        let down = test_app_with_store(
            Arc::new(FailingStore),
            StubLanguageModel::replying("q"),
            StubWebSearch::default(),
        );
        let (status, body) = send(down, request()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, 503);
    }

    #[tokio::test]
    async fn http_status_mirrors_envelope_code() {
        let request = Request::builder()
            .uri("/api/v1/articles?article_id=missing")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(stub_app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, 404);
        assert_eq!(body.message, "Article with id missing not found");
    }

    #[tokio::test]
    async fn malformed_bodies_are_400_envelopes() {
        let (status, body) = send(
            stub_app(),
            json_request("POST", "/api/v1/articles", json!({"article_info": {"title": "x"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.result);

        let (status, body) = send(
            stub_app(),
            json_request(
                "POST",
                "/api/v1/articles",
                json!({"article_info": {
                    "title": "x", "content": "c", "url": "u", "date": "yesterday"
                }}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("field_errors").and_then(|f| f.get("date")).is_some());
    }

    #[tokio::test]
    async fn missing_query_parameter_is_400() {
        let request = Request::builder().uri("/api/v1/users").body(Body::empty()).unwrap();
        let (status, _) = send(stub_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn cors_is_optional() {
        let mut security = AppConfig::for_tests().security;
        security.enable_cors = false;
        assert!(cors_layer(&security).is_none());

        security.enable_cors = true;
        security.cors_origins = vec!["https://echofeed.example".into()];
        assert!(cors_layer(&security).is_some());
    }
}
