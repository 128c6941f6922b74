//! Data models
//!
//! Shared between the signup server and the browser client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGINT identity). Wire names are camelCase.

pub mod member;
pub mod signup;

// Re-exports
pub use member::*;
pub use signup::*;
