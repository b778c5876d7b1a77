pub mod article_service;
pub mod entity_service;
pub mod user_service;

pub use article_service::ArticleService;
pub use entity_service::EntityService;
pub use user_service::UserService;

use serde_json::Value;

use crate::api::Envelope;
use crate::error::ApiError;

/// Failure envelope that keeps the operation's payload key, set to null
pub(crate) fn failed(err: ApiError, payload_key: Option<String>) -> Envelope {
    let envelope = err.to_envelope();
    match payload_key {
        Some(key) => envelope.with(key, Value::Null),
        None => envelope,
    }
}
