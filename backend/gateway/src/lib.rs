//! gamegate HTTP gateway
//!
//! Serves quota-gated game pages, the auth cookie endpoints, and health.

pub mod access;
pub mod auth;
pub mod auth_api;
pub mod content;
pub mod cookies;
pub mod error;
pub mod games_api;
pub mod headers;
pub mod health_api;
pub mod quota_api;
pub mod server;
pub mod state;

pub use access::{AccessService, Grant, MAX_CLAIM_ATTEMPTS};
pub use content::ContentStore;
pub use cookies::CookieSettings;
pub use error::ApiError;
pub use server::{build_router, start_server};
pub use state::AppState;
