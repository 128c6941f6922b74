//! Shared types for the church signup service
//!
//! Error codes and the JSON error body, member models, and the signup form
//! validation rules. Nothing in here performs I/O, so the same rules can run
//! in the browser client and again on the API server.

pub mod error;
pub mod models;
pub mod util;
pub mod validation;

// Re-exports
pub use serde::{Deserialize, Serialize};
