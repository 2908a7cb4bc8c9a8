//! Request metrics middleware.

use std::time::Instant;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::state::AppState;

/// Count every request and observe its duration.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    state.metrics().record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
