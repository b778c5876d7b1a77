// HTTP API Error Types
use axum::response::IntoResponse;
use std::collections::HashMap;

use crate::api::envelope::Envelope;
use crate::content::ContentError;
use crate::store::StoreError;

/// API error carrying the envelope code and a client-facing message
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 424 Failed Dependency (store or content helper failed)
    FailedDependency(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Envelope / HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::FailedDependency(_) => 424,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::FailedDependency(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the failure envelope `{message, code, result: false}`
    pub fn to_envelope(&self) -> Envelope {
        let envelope = Envelope::failure(self.status_code(), self.message());
        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            } => envelope.with("field_errors", serde_json::json!(field_errors)),
            _ => envelope,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), problem.clone());
        ApiError::validation_error(format!("Invalid {}: {}", field, problem), Some(field_errors))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn failed_dependency(message: impl Into<String>) -> Self {
        ApiError::FailedDependency(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Store failures keep the original error text in the message
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::Conflict { .. } => ApiError::conflict(err.to_string()),
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::failed_dependency(other.to_string())
            }
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        tracing::error!("Content helper error: {}", err);
        ApiError::failed_dependency(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        self.to_envelope().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_classified() {
        let missing: ApiError = StoreError::not_found("users", "ana").into();
        assert_eq!(missing.status_code(), 404);

        let duplicate: ApiError = StoreError::conflict("users", "ana").into();
        assert_eq!(duplicate.status_code(), 409);

        let backend: ApiError = StoreError::Backend {
            status: 500,
            body: "shard failure".into(),
        }
        .into();
        assert_eq!(backend.status_code(), 424);
        assert!(backend.message().contains("shard failure"));
    }

    #[test]
    fn validation_envelope_lists_fields() {
        let err = ApiError::invalid_field("date", "expected YYYY-MM-DD");
        let envelope = err.to_envelope();
        assert_eq!(envelope.code, 400);
        assert!(!envelope.result);
        assert_eq!(
            envelope.get("field_errors").and_then(|v| v.get("date")),
            Some(&serde_json::json!("expected YYYY-MM-DD"))
        );
    }
}
