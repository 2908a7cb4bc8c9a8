//! API token authentication middleware.
//!
//! Checks for `Authorization: Bearer <token>` headers and, if valid, makes
//! the token's user the current user for the request.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::models::User;
use crate::state::AppState;

/// The user a request acts as. Anonymous when no token was presented.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that authenticates via Bearer token.
///
/// - Valid token -> inserts its user as [`CurrentUser`]
/// - Unknown token -> returns 401 JSON error
/// - No header -> passes through as the anonymous user
pub async fn authenticate_api_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user = match auth_header.and_then(|v| v.strip_prefix("Bearer ")) {
        None => User::anonymous(),
        Some(raw_token) => match state.users().find_by_token(raw_token.trim()) {
            Some(user) => {
                debug!(user_id = %user.id, "authenticated by API token");
                user
            }
            None => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [("WWW-Authenticate", "Bearer error=\"invalid_token\"")],
                    axum::Json(json!({"error": "Invalid API token"})),
                )
                    .into_response();
            }
        },
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_else(|| CurrentUser(User::anonymous())))
    }
}
