//! Public block pages.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::controller::ActionContext;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::permissions::Action;
use crate::state::AppState;

use super::helpers::{content_type, respond};

/// Create the public page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{route}/{slug}", get(view_as_page))
        .route("/{route}/{year}/{month}/{day}/{slug}", get(view_dated_page))
}

/// Query parameters for page views.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// `view` shows the public page even to users who could edit it.
    pub mode: Option<String>,
}

impl PageQuery {
    fn view_mode(&self) -> bool {
        self.mode.as_deref() == Some("view")
    }
}

async fn view_as_page(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, slug)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state
        .controller()
        .view_as_page(&ctx, &slug, query.view_mode())
        .await;
    Ok(respond(&state, &session, &ct, Action::ViewAsPage, result).await)
}

async fn view_dated_page(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, year, month, day, slug)): Path<(String, i32, u32, u32, String)>,
) -> AppResult<Response> {
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state
        .controller()
        .view_dated_page(&ctx, (year, month, day), &slug)
        .await;
    Ok(respond(&state, &session, &ct, Action::ViewAsPage, result).await)
}
