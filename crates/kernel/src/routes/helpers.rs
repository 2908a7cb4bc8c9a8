//! Shared route helpers: access gates and outcome rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use tower_sessions::Session;
use tracing::warn;

use crate::controller::{Flash, FormState, Outcome};
use crate::error::{AppError, BlockError, BlockResult};
use crate::models::{ContentType, User};
use crate::permissions::Action;
use crate::state::AppState;

/// Session key for the pending status message.
pub const SESSION_FLASH: &str = "flash";

/// Require a user who may use the CMS.
///
/// Anonymous requests get 401; authenticated users without `access cms`
/// get 403.
pub fn require_cms(user: &User) -> Result<(), AppError> {
    if user.is_anonymous() {
        return Err(AppError::Unauthorized);
    }
    if !user.can_access_cms() {
        return Err(AppError::Block(BlockError::AccessDenied));
    }
    Ok(())
}

/// Look up a content type by its URL segment.
pub fn content_type(state: &AppState, route: &str) -> Result<ContentType, AppError> {
    state
        .content_types()
        .get_by_route(route)
        .ok_or_else(|| AppError::Block(BlockError::not_found(format!("content type {route}"))))
}

/// Take the pending status message, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(SESSION_FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            warn!(error = %e, "failed to read flash from session");
            None
        }
    }
}

/// Turn a controller result into an HTTP response and count it.
///
/// Renders become a JSON view document (200, or 422/409 for rejected
/// forms), redirects become 303 with the status message stored in the
/// session, and `NotImplemented` becomes 501.
pub async fn respond(
    state: &AppState,
    session: &Session,
    content_type: &ContentType,
    action: Action,
    result: BlockResult<Outcome>,
) -> Response {
    let label = match &result {
        Ok(outcome) => outcome.label(),
        Err(BlockError::NotFound(_)) => "not_found",
        Err(BlockError::AccessDenied) => "denied",
        Err(BlockError::Validation(_)) => "invalid",
        Err(BlockError::EditConflict { .. }) => "conflict",
        Err(BlockError::Unexpected(_)) => "error",
    };
    state
        .metrics()
        .record_action(&content_type.key, action.name(), label);

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => return AppError::from(e).into_response(),
    };

    match outcome {
        Outcome::Render { view, model } => {
            let status = match model.form_state {
                FormState::Fresh => StatusCode::OK,
                FormState::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                FormState::Conflict => StatusCode::CONFLICT,
            };
            let flash = take_flash(session).await;
            let body = json!({
                "view": view,
                "template": view.template(),
                "layout": view.layout(),
                "flash": flash,
                "model": model,
            });
            (status, Json(body)).into_response()
        }
        Outcome::Redirect { location, flash } => {
            if let Some(flash) = flash {
                if let Err(e) = session.insert(SESSION_FLASH, flash).await {
                    warn!(error = %e, "failed to store flash in session");
                }
            }
            Redirect::to(&location).into_response()
        }
        Outcome::NotImplemented => (
            StatusCode::NOT_IMPLEMENTED,
            Json(json!({
                "error": format!("{} does not keep versions", content_type.display_name)
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::permission;

    #[test]
    fn cms_gate() {
        assert!(matches!(
            require_cms(&User::anonymous()),
            Err(AppError::Unauthorized)
        ));

        let mut user = User::anonymous();
        user.id = uuid::Uuid::now_v7();
        assert!(matches!(
            require_cms(&user),
            Err(AppError::Block(BlockError::AccessDenied))
        ));

        user.permissions.push(permission::ACCESS_CMS.to_string());
        assert!(require_cms(&user).is_ok());
    }
}
