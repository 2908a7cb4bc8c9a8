//! Prometheus metrics endpoint.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::state::AppState;

/// Prometheus text exposition content type.
const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Create the metrics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}

/// Returns metrics in Prometheus text exposition format.
async fn metrics(State(state): State<AppState>) -> Response {
    let output = state.metrics().encode();

    (StatusCode::OK, [("content-type", CONTENT_TYPE)], output).into_response()
}
