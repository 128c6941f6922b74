//! Error codes for the signup service
//!
//! Codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Signup errors
//! - 2xxx: Member lookup errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the browser client can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Resource not found
    NotFound = 3,
    /// Request body could not be parsed
    InvalidRequest = 5,

    // ==================== 1xxx: Signup ====================
    /// One or more of the five required signup fields is absent
    MissingRequiredFields = 1001,
    /// Email is already used by another member
    EmailAlreadyRegistered = 1002,
    /// Signup transaction failed and was rolled back
    SignupFailed = 1003,

    // ==================== 2xxx: Member ====================
    /// Member does not exist
    MemberNotFound = 2001,
    /// Member read query failed
    MemberFetchFailed = 2002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Title sent as the `error` field of the response body
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Signup
            ErrorCode::MissingRequiredFields => "Missing required fields",
            ErrorCode::EmailAlreadyRegistered => "Email already registered",
            ErrorCode::SignupFailed => "Signup failed",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MemberFetchFailed => "Failed to fetch members",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Signup
            1001 => Ok(ErrorCode::MissingRequiredFields),
            1002 => Ok(ErrorCode::EmailAlreadyRegistered),
            1003 => Ok(ErrorCode::SignupFailed),

            // Member
            2001 => Ok(ErrorCode::MemberNotFound),
            2002 => Ok(ErrorCode::MemberFetchFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
