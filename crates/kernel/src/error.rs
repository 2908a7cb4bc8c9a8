//! Application error types.
//!
//! [`BlockError`] is the domain error raised by the store, the versioning
//! policy, the permission policy, and the lifecycle controller.
//! [`AppError`] is the HTTP-facing error that handlers return.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// A single rejected field from form validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Content block errors.
#[derive(Debug, Error)]
pub enum BlockError {
    /// Missing block, version, section, page, or content type.
    #[error("not found: {0}")]
    NotFound(String),

    /// Save or update rejected by data rules.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The stored lock version moved between load and save.
    #[error("block {id} was changed by someone else (expected lock version {expected}, found {found})")]
    EditConflict { id: Uuid, expected: i32, found: i32 },

    /// Permission check failed.
    #[error("access denied")]
    AccessDenied,

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl BlockError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<sqlx::Error> for BlockError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unexpected(anyhow::Error::new(e))
    }
}

impl From<validator::ValidationErrors> for BlockError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(fields)
    }
}

/// Result type alias using BlockError.
pub type BlockResult<T> = Result<T, BlockError>;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Block(#[from] BlockError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Block(BlockError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, format!("not found: {what}"))
            }
            AppError::Block(BlockError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Block(BlockError::EditConflict { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Block(BlockError::AccessDenied) => {
                (StatusCode::FORBIDDEN, "access denied".to_string())
            }
            AppError::Block(BlockError::Unexpected(e)) | AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
