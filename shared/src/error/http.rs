//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound | Self::MemberNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::EmailAlreadyRegistered => StatusCode::CONFLICT,

            // 500 Internal Server Error (timeouts included)
            Self::SignupFailed | Self::MemberFetchFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::InvalidRequest | Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
        }
    }
}
