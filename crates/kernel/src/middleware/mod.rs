//! HTTP middleware components.
//!
//! Resolves the current user from API tokens and records request metrics.

mod auth;
mod request_metrics;

pub use auth::{CurrentUser, authenticate_api_token};
pub use request_metrics::track_requests;
