//! signup-server: church membership signup API
//!
//! Accepts signups from the browser form, writes each member and their
//! ministry interests in one transaction, and serves the member list.

pub mod api;
pub mod config;
pub mod db;
pub mod notify;
pub mod signup;
pub mod state;
