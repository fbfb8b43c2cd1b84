//! HTTP error mapping.
//!
//! Handlers return [`AppError`]; the [`IntoResponse`] impl turns every
//! variant into a `{ "error", "code" }` JSON body. Domain failures come
//! through [`CoreError`] with their messages intact; database failures are
//! classified here, including per-constraint messages for the schema's
//! unique indexes. Internal failures respond opaque and log the detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use basket_core::error::CoreError;
use serde::Serialize;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `basket_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// The JSON body every error response carries.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => internal_response(&msg),
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

/// Map a domain error to its HTTP status and code. Messages pass through
/// unchanged except for `Internal`, which responds opaque.
fn classify_core_error(err: CoreError) -> (StatusCode, &'static str, String) {
    match err {
        not_found @ (CoreError::NotFound { .. } | CoreError::NotFoundNamed { .. }) => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", not_found.to_string())
        }
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::Internal(msg) => internal_response(&msg),
    }
}

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (PostgreSQL code 23505) on a `uq_`-named
///   constraint map to 409 with a message for that constraint.
/// - Everything else maps to an opaque 500; the detail is logged.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    unique_violation_message(constraint),
                );
            }
        }
    }

    internal_response(err)
}

/// Human messages for the schema's unique constraints.
///
/// These races are reachable even though handlers pre-check duplicates
/// (register, share, catalog create), so the message must stand on its
/// own. Constraints without an entry get a generic duplicate message.
fn unique_violation_message(constraint: &str) -> String {
    match constraint {
        "uq_users_username" => "Username already taken".to_string(),
        "uq_users_email" => "Email already registered".to_string(),
        "uq_list_shares_list_user" => "List is already shared with this user".to_string(),
        "uq_categories_name" => "A category with this name already exists".to_string(),
        "uq_catalog_items_name" => "A catalog item with this name already exists".to_string(),
        "uq_catalog_items_barcode" => {
            "A catalog item with this barcode already exists".to_string()
        }
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Opaque 500: log the detail, respond with a generic message.
fn internal_response(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
