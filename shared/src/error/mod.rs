//! Unified error system for the signup service
//!
//! - [`ErrorCode`]: numeric codes, each with a wire title and HTTP status
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: code + optional message + flattened details
//! - [`ErrorBody`]: the JSON shape every failed request returns
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Signup errors
//! - 2xxx: Member lookup errors
//!
//! Every 5xx response is logged at error level when it is rendered.
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::EmailAlreadyRegistered, "Use another address")
//!     .with_detail("field", "email");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.error, "Email already registered");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
