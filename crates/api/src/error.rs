use atelier_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type returned by every HTTP handler.
///
/// Rendered as `{"error": <message>, "code": <CODE>}` with a matching status.
/// Server-side failures are logged and replaced by a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reading or writing the photo store.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Lookup by something other than a numeric id (e.g. a public form key).
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

type ErrorParts = (StatusCode, &'static str, String);

/// Field names are reported, individual rule messages are not.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        CoreError::Validation(format!("Invalid value for: {}", fields.join(", "))).into()
    }
}

fn internal(source: &dyn std::fmt::Display, what: &str) -> ErrorParts {
    tracing::error!(error = %source, "{what}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn core_parts(err: &CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => internal(msg, "Internal core error"),
    }
}

/// Map a sqlx error onto the API error vocabulary.
///
/// Named unique constraints (`uq_*`) become 409, foreign key and check
/// violations become 400. Anything else is a 500.
fn database_parts(err: &sqlx::Error) -> ErrorParts {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => return internal(other, "Database error"),
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        // unique_violation
        Some("23505") if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        // foreign_key_violation
        Some("23503") => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Referenced row does not exist: {constraint}"),
        ),
        // check_violation
        Some("23514") => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Value violates check constraint: {constraint}"),
        ),
        _ => internal(db_err, "Database error"),
    }
}

fn storage_parts(err: &std::io::Error) -> ErrorParts {
    if err.kind() == std::io::ErrorKind::NotFound {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Stored file not found".to_string(),
        );
    }
    internal(err, "Photo storage error")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::Storage(err) => storage_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => internal(msg, "Internal error"),
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}
