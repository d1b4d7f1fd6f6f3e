//! Middleware module for Relation HTTP server
//!
//! Provides:
//! - Session cookie extraction (`CurrentUser`)

pub mod auth;
