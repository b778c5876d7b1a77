use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Uniform response body: `{message, code, result, <payload fields>}`.
///
/// Payload keys depend on the operation (`article_id`, `user_info`,
/// `articles_info`, `articles`, `keywords`, `categories`) and sit next to
/// the base triad rather than under a nested object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message: String,
    pub code: u16,
    pub result: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Create a 200 envelope with `result: true`
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 200,
            result: true,
            payload: Map::new(),
        }
    }

    /// Create a failure envelope with `result: false`
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            result: false,
            payload: Map::new(),
        }
    }

    /// Set a payload field
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// True when `key` is present and not null
    pub fn has_payload(&self, key: &str) -> bool {
        matches!(self.payload.get(key), Some(value) if !value.is_null())
    }

    pub fn is_success(&self) -> bool {
        self.result
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ApiError> for Envelope {
    fn from(err: ApiError) -> Self {
        err.to_envelope()
    }
}

// HTTP status mirrors the envelope code
impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_flattened_next_to_the_triad() {
        let envelope = Envelope::success("ok").with("article_id", json!("a1"));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({ "message": "ok", "code": 200, "result": true, "article_id": "a1" })
        );

        let parsed: Envelope = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.get("article_id"), Some(&json!("a1")));
    }

    #[test]
    fn null_payload_is_not_populated() {
        let envelope = Envelope::failure(404, "missing").with("user_info", Value::Null);
        assert!(envelope.payload.contains_key("user_info"));
        assert!(!envelope.has_payload("user_info"));
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn dependency_failure_maps_to_424_status() {
        let envelope = Envelope::failure(424, "store down");
        assert_eq!(envelope.status(), StatusCode::FAILED_DEPENDENCY);
    }
}
