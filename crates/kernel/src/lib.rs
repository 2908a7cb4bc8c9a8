//! blockcms kernel library
//!
//! Content block lifecycle: storage, versioning, permissions, the lifecycle
//! controller, and the HTTP surface over them. The `blockcms` binary runs
//! the server.

pub mod accounts;
pub mod config;
pub mod content;
pub mod controller;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::Config;
pub use state::AppState;

/// Build the application router over `state`.
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::metrics::router())
        .merge(routes::blocks::router())
        .merge(routes::pages::router())
        // Middleware layers (last added = first executed in request flow):
        // TraceLayer → metrics → CORS → session → api_token → routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate_api_token,
        ))
        .layer(session::create_session_layer())
        .layer(build_cors_layer(config))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        // Credentialed CORS may not use wildcard headers.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
