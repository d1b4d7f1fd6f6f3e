//! Server module for Relation
//!
//! Contains the main server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `init_helpers`: Optional integrations (embeddings, index, sheets, summaries)
//! - `state`: Shared service container
//! - `validation`: Production configuration validation
//! - `init`: Service wiring and the HTTP run loop

pub mod config;
mod init;
mod init_helpers;
mod loader;
pub mod state;
mod validation;

// Re-export public API
pub use init::{drain_effects, init_services, run};
pub use loader::load_config;
pub use state::{AppState, Integrations};
