//! Content library route handlers.
//!
//! Every `/cms/{type}` route maps onto one controller action. All of them
//! require a user with `access cms`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::controller::{ActionContext, ListQuery};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::BlockForm;
use crate::permissions::Action;
use crate::state::AppState;

use super::helpers::{content_type, require_cms, respond};

/// Create the content library router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cms/{type}", get(list_blocks).post(create_block))
        .route("/cms/{type}/new", get(new_block))
        .route("/cms/{type}/{id}", get(show_block))
        .route("/cms/{type}/{id}/edit", get(edit_block).post(update_block))
        .route("/cms/{type}/{id}/delete", post(destroy_block))
        .route("/cms/{type}/{id}/publish", post(publish_block))
        .route("/cms/{type}/{id}/revert_to/{version}", post(revert_block))
        .route("/cms/{type}/{id}/version/{version}", get(show_version))
        .route("/cms/{type}/{id}/versions", get(list_versions))
        .route("/cms/{type}/{id}/usages", get(usages))
}

/// Query parameters for the new-block form.
#[derive(Debug, Default, Deserialize)]
pub struct NewBlockQuery {
    /// Explicit parent section.
    pub section_id: Option<Uuid>,
}

/// Query parameters accepted by commands.
#[derive(Debug, Default, Deserialize)]
pub struct CommandQuery {
    #[serde(rename = "_redirect_to")]
    pub redirect_to: Option<String>,
}

/// Body of create and update requests.
#[derive(Debug, Default, Deserialize)]
pub struct BlockSubmission {
    #[serde(flatten)]
    pub block: BlockForm,

    /// Parent section for new blocks.
    pub section_id: Option<Uuid>,

    #[serde(rename = "_redirect_to")]
    pub redirect_to: Option<String>,
}

async fn list_blocks(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(route): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().list(&ctx, query).await;
    Ok(respond(&state, &session, &ct, Action::List, result).await)
}

async fn new_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(route): Path<String>,
    Query(query): Query<NewBlockQuery>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().new_block(&ctx, query.section_id).await;
    Ok(respond(&state, &session, &ct, Action::New, result).await)
}

async fn create_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(route): Path<String>,
    Json(submission): Json<BlockSubmission>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct).with_redirect(submission.redirect_to.as_deref());

    let result = state
        .controller()
        .create(&ctx, submission.block, submission.section_id)
        .await;
    Ok(respond(&state, &session, &ct, Action::Create, result).await)
}

async fn show_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().show(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::Show, result).await)
}

async fn edit_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().edit(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::Edit, result).await)
}

async fn update_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
    Json(submission): Json<BlockSubmission>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct).with_redirect(submission.redirect_to.as_deref());

    let result = state.controller().update(&ctx, id, submission.block).await;
    Ok(respond(&state, &session, &ct, Action::Update, result).await)
}

async fn destroy_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
    Query(query): Query<CommandQuery>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct).with_redirect(query.redirect_to.as_deref());

    let result = state.controller().destroy(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::Destroy, result).await)
}

async fn publish_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
    Query(query): Query<CommandQuery>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct).with_redirect(query.redirect_to.as_deref());

    let result = state.controller().publish(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::Publish, result).await)
}

async fn revert_block(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id, version)): Path<(String, Uuid, i32)>,
    Query(query): Query<CommandQuery>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct).with_redirect(query.redirect_to.as_deref());

    let result = state.controller().revert_to(&ctx, id, version).await;
    Ok(respond(&state, &session, &ct, Action::Revert, result).await)
}

async fn show_version(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id, version)): Path<(String, Uuid, i32)>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().show_version(&ctx, id, Some(version)).await;
    Ok(respond(&state, &session, &ct, Action::ShowVersion, result).await)
}

async fn list_versions(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().list_versions(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::ListVersions, result).await)
}

async fn usages(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path((route, id)): Path<(String, Uuid)>,
) -> AppResult<Response> {
    require_cms(&user)?;
    let ct = content_type(&state, &route)?;
    let ctx = ActionContext::new(&user, &ct);

    let result = state.controller().usages(&ctx, id).await;
    Ok(respond(&state, &session, &ct, Action::Usages, result).await)
}
