use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::ErrorStatusMode;

/// Application error type
///
/// The display string is what callers see in the `error` field, so variants
/// carry messages that are safe to return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body is missing, malformed, or fails validation
    #[error("{0}")]
    BadRequest(String),

    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// A required server setting is absent
    #[error("{0}")]
    Misconfigured(String),

    /// An upstream provider rejected the request
    #[error("{0}")]
    Upstream(String),

    /// Anything else: network failures, undecodable responses
    #[error("{0}")]
    InternalServerError(String),
}

impl AppError {
    /// Get the HTTP status code for this error under the given mapping
    pub fn status_code(&self, mode: ErrorStatusMode) -> StatusCode {
        match mode {
            ErrorStatusMode::Uniform => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorStatusMode::Typed => match self {
                AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
                AppError::Misconfigured(_) | AppError::InternalServerError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Whether the error was already logged, with request context, where it arose
    ///
    /// Upstream and internal failures are only built from store or provider
    /// errors, and those call sites log the underlying cause.
    pub fn is_logged_at_source(&self) -> bool {
        matches!(self, AppError::Upstream(_) | AppError::InternalServerError(_))
    }

    /// Log the error at the appropriate level, unless it was logged at its source
    pub fn log(&self) {
        match self {
            AppError::BadRequest(msg) => tracing::warn!("Bad request: {}", msg),
            AppError::NotFound(msg) => tracing::warn!("Not found: {}", msg),
            AppError::Misconfigured(msg) => tracing::error!("Misconfigured: {}", msg),
            AppError::Upstream(_) | AppError::InternalServerError(_) => {}
        }
    }

    /// Build the `{ "error": ... }` response using the given status mapping
    pub fn into_response_with(self, mode: ErrorStatusMode) -> Response {
        self.log();

        let status = self.status_code(mode);
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(ErrorStatusMode::Uniform)
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
