//! Health check endpoint.
//!
//! Returns 200 OK if the block store is reachable, 503 otherwise.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
    postgres: bool,
    content_types: usize,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let postgres = state.postgres_healthy().await;

    let (status, status_code) = if postgres {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            store: if state.db().is_some() { "postgres" } else { "memory" },
            postgres,
            content_types: state.content_types().len(),
        }),
    )
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
