//! HTTP error type and its JSON rendering.
//!
//! Handlers return [`AppError`]; the [`IntoResponse`] impl turns every
//! variant into `{"error": <Korean message>, "code": <ENGLISH_CODE>}` with
//! the matching status. Korean is the product language, so user-facing
//! messages are Korean while codes and log lines stay English.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postpilot_core::error::CoreError;
use serde_json::json;

/// Fallback body for anything the client should not see the details of.
const INTERNAL_MESSAGE: &str = "내부 오류가 발생했습니다";

/// Error type for every handler in this crate.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain error bubbled up from `postpilot_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// sqlx error; classified into 404/409/500 when rendered.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 400 with a caller-provided message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 404 for resources addressed by something other than a numeric id
    /// (share tokens, mostly).
    #[error("Not found: {0}")]
    NotFound(String),

    /// 500 whose real message goes only to the log.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Handler return alias.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.render();
        let body = json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

impl AppError {
    /// Status, machine code, and user message for this error.
    fn render(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

fn render_core(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity}을(를) 찾을 수 없습니다 (id: {id})"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Gone(msg) => (StatusCode::GONE, "GONE", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

/// Map a sqlx error onto an HTTP response.
///
/// `RowNotFound` is a plain 404. A Postgres 23505 on one of our `uq_*`
/// constraints is a 409 (the schema names every intentional uniqueness rule
/// that way). Anything else is logged and answered with a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "요청한 리소스를 찾을 수 없습니다".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                tracing::warn!(constraint, "Unique constraint violation");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "이미 존재하는 값입니다".to_string(),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}
