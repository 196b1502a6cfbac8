use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Validation failures answer with `{ "reason": "..." }`; every other error
/// answers with `{ "message": "..." }`.
pub enum AppError {
    /// 400 Bad Request — malformed or missing input
    BadRequest(String),
    /// 401 Unauthorized — no valid principal or no rater profile
    Unauthorized(String),
    /// 403 Forbidden — acting rater does not own the resource
    Forbidden(String),
    /// 404 Not Found
    NotFound(String),
    /// 422 Unprocessable Entity — duplicate association
    Conflict(String),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "reason": reason }))).into_response()
            }
            Self::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": msg }))).into_response()
            }
            Self::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "message": msg }))).into_response()
            }
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": msg }))).into_response()
            }
            Self::Conflict(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": msg })),
            )
                .into_response(),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "An internal error occurred" })),
                )
                    .into_response()
            }
        }
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

/// Translate a store error raised by a write into the client-facing taxonomy.
///
/// Unique and foreign-key violations answer 400; anything else answers 500.
/// Raw driver text is never echoed to the client.
pub fn db_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest("A row with these values already exists".to_string())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::BadRequest("A referenced row does not exist".to_string())
        }
        _ => AppError::Internal(err.into()),
    }
}
