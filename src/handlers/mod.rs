//! Endpoint adapters. Thin by design — each handler establishes the caller
//! (extractor), ensures the shared connection, delegates to the repository
//! or suggestion engine, and maps the outcome to a response.
//!
//! - `auth` — registration and login
//! - `tasks` — ownership-scoped task CRUD + AI suggestions
//! - `health` — liveness and provider availability

pub mod auth;
pub mod health;
pub mod tasks;

// Re-export everything (including utoipa __path_* types needed by OpenApi derive)
pub use auth::*;
pub use health::*;
pub use tasks::*;
