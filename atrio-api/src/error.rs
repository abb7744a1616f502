use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use atrio_core::{HoldError, LifecycleError};
use atrio_domain::LedgerError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    ForbiddenError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ForbiddenError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

/// Hold contention is a normal outcome; only the window shape is a caller
/// mistake.
pub fn hold_error(err: HoldError) -> AppError {
    match err {
        HoldError::InvalidWindow => AppError::ValidationError(err.to_string()),
        HoldError::Conflict => AppError::ConflictError(err.to_string()),
    }
}

pub fn lifecycle_error(err: LifecycleError) -> AppError {
    match err {
        LifecycleError::InvalidWindow => AppError::ValidationError(err.to_string()),
        LifecycleError::Conflict => AppError::ConflictError(err.to_string()),
        LifecycleError::NotFound(_) => AppError::NotFoundError(err.to_string()),
        LifecycleError::InvalidTransition { .. } => AppError::ForbiddenError(err.to_string()),
        LifecycleError::Ledger(msg) => AppError::InternalServerError(msg),
    }
}

pub fn ledger_error(err: LedgerError) -> AppError {
    match err {
        LedgerError::NotFound(_) => AppError::NotFoundError(err.to_string()),
        LedgerError::Conflict => AppError::ConflictError(err.to_string()),
        LedgerError::Backend(msg) => AppError::InternalServerError(msg),
    }
}
