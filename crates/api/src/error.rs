use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use turkce_core::error::CoreError;

/// Message returned in place of any store or internal failure detail.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by every handler.
///
/// Renders as `{ "error": <message>, "code": <CODE> }` with the matching
/// status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A body that is not valid JSON for the endpoint.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, and client-facing message of an error.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

impl AppError {
    /// Message safe to hand to a client, also used for bulk item failures.
    pub fn public_message(&self) -> String {
        self.parts().message
    }

    fn parts(&self) -> ErrorParts {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::BadRequest(msg) => ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = self.parts();
        if parts.status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = json!({ "error": parts.message, "code": parts.code });
        (parts.status, axum::Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, key } => ErrorParts::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} {key} not found"),
        ),
        CoreError::Validation(msg) => {
            ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
        }
        CoreError::RuleViolation(msg) => {
            ErrorParts::new(StatusCode::CONFLICT, "RULE_VIOLATION", msg)
        }
        CoreError::Unauthorized(msg) => {
            ErrorParts::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
        }
    }
}

/// Map store failures onto the schema's constraints.
///
/// - 23505 on a `uq_*` constraint: 409 `CONFLICT`.
/// - 23514 (CHECK): 400 `VALIDATION_ERROR`, e.g. an unknown content type tag.
/// - 23503 (foreign key): 409 `RULE_VIOLATION`, a version still referenced
///   by a content head.
/// - anything else: 500 with the detail withheld.
fn database_parts(err: &sqlx::Error) -> ErrorParts {
    let sqlx::Error::Database(db_err) = err else {
        return ErrorParts::internal();
    };
    let constraint = db_err.constraint().unwrap_or("unknown");

    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => ErrorParts::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        Some("23514") => ErrorParts::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates check constraint: {constraint}"),
        ),
        Some("23503") => ErrorParts::new(
            StatusCode::CONFLICT,
            "RULE_VIOLATION",
            "Version is still referenced by its content head",
        ),
        _ => ErrorParts::internal(),
    }
}
