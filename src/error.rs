use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-visible message for unrecognized internal faults. The original detail is
/// retained only for diagnostics (logs), never sent to the caller.
pub const GENERIC_FAULT_MESSAGE: &str =
    "An unexpected error has occurred. To solve the issue, contact the person responsible for your Server.";

/// Client-visible message when the fault corresponds to an expired session token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";

/// ApiError
///
/// The application's stable error taxonomy. Every failure that crosses the
/// service/transport boundary is one of these variants; the `IntoResponse` impl
/// below is the single top-level fault boundary producing the client-visible shape.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation failure on input shape (rejected before reaching the repository).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid caller identity.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's role lacks the required action token.
    #[error("{0}")]
    Forbidden(String),

    /// The requested id does not exist for the resource.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness invariant would be violated by a write.
    #[error("{0}")]
    Conflict(String),

    /// Any unrecognized internal error. `message` is what the caller sees;
    /// `detail` is the original error text, kept for the logs.
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    /// Wraps a low-level failure as an internal fault. The caller-facing message is
    /// generic, except when the detail identifies an expired session token.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let message = if detail.contains("jwt expired") || detail.contains("ExpiredSignature") {
            SESSION_EXPIRED_MESSAGE.to_string()
        } else {
            GENERIC_FAULT_MESSAGE.to_string()
        };
        ApiError::Internal { message, detail }
    }

    /// Standard not-found error for a resource, e.g. `ApiError::not_found("Blog")`.
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{entity} not found"))
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorBody
///
/// The stable JSON envelope every error response carries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal faults keep their original detail in the logs only.
        if let ApiError::Internal { ref detail, .. } = self {
            tracing::error!(detail = %detail, "internal fault");
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// --- Storage error normalization ---

/// Maps a unique-constraint name to the wire names of the conflicting fields.
/// A constraint missing from this table has no identifiable fields, in which case
/// the storage error passes through unchanged (it is not rewritten into a Conflict).
fn conflict_fields(constraint: &str) -> Option<&'static [&'static str]> {
    match constraint {
        "blogs_title_key" => Some(&["title"]),
        "likes_post_id_user_id_key" => Some(&["postId", "userId"]),
        "users_email_key" => Some(&["email"]),
        _ => None,
    }
}

/// normalize_storage_error
///
/// The explicit mapping rule applied at the boundary between repository and
/// transport for every mutating call. A storage-layer uniqueness violation with
/// identifiable fields becomes a Conflict naming them:
/// `"<Entity> <field1, field2> has already been taken"`. Everything else is
/// forwarded untouched to the generic fault boundary.
pub fn normalize_storage_error(entity: &str, err: sqlx::Error) -> ApiError {
    if let Some(db_err) = err.as_database_error() {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            if let Some(fields) = db_err.constraint().and_then(conflict_fields) {
                return ApiError::Conflict(format!(
                    "{entity} {} has already been taken",
                    fields.join(", ")
                ));
            }
        }
    }
    ApiError::internal(err.to_string())
}
