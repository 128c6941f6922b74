//! Application error and its JSON body

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Application error with a structured code, optional message and details
///
/// Renders as `{"error": <title>, "message": <message>, ...details}`. The
/// title always comes from the code, so callers can match on it.
#[derive(Debug, Clone)]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable explanation for the end user
    pub message: Option<String>,
    /// Extra top-level keys merged into the response body
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error carrying only the code's title
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a not found error
    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or(self.code.message()))
    }
}

impl std::error::Error for AppError {}

/// JSON body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short title derived from the error code
    pub error: String,
    /// Human-readable explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Additional keys (e.g. `required`)
    #[serde(flatten)]
    pub details: HashMap<String, Value>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.code.message().to_string(),
            message: err.message.clone(),
            details: err.details.clone().unwrap_or_default(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorBody::from(&self);

        if status.is_server_error() {
            tracing::error!(
                code = %self.code,
                category = ?self.code.category(),
                message = %self,
                "Request failed with a server error"
            );
        }

        (status, Json(body)).into_response()
    }
}
