//! Application error type and its HTTP representation.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned in the `error` field of responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Every failure the short-link lifecycle can produce.
///
/// All variants are recovered at the HTTP/CLI boundary and turned into
/// user-visible messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Empty or unusable input (missing URL, malformed request body).
    #[error("{message}")]
    InvalidInput { message: String, details: Value },

    /// The short code is already held by another link.
    #[error("Short code \"{code}\" is already taken")]
    CodeTaken { code: String },

    /// No link is stored under the requested code.
    #[error("Short link not found")]
    NotFound { code: String },

    /// The link existed but had expired; it has been deleted.
    #[error("Short link has expired and been deleted")]
    Expired { code: String },

    /// The remote store could not be reached or rejected the request.
    #[error("{message}")]
    Store { message: String, details: Value },
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidInput {
            message: message.into(),
            details,
        }
    }

    pub fn code_taken(code: impl Into<String>) -> Self {
        Self::CodeTaken { code: code.into() }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn expired(code: impl Into<String>) -> Self {
        Self::Expired { code: code.into() }
    }

    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
        }
    }

    /// HTTP status used when this error reaches an API client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::CodeTaken { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Expired { .. } => StatusCode::GONE,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "validation_error",
            AppError::CodeTaken { .. } => "code_taken",
            AppError::NotFound { .. } => "not_found",
            AppError::Expired { .. } => "expired",
            AppError::Store { .. } => "store_error",
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let details = match self {
            AppError::InvalidInput { details, .. } | AppError::Store { details, .. } => {
                details.clone()
            }
            AppError::CodeTaken { code }
            | AppError::NotFound { code }
            | AppError::Expired { code } => json!({ "code": code }),
        };

        ErrorInfo {
            code: self.kind(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::Store { message, details } = &self {
            tracing::error!(%message, %details, "Store error surfaced to client");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::invalid_input(message, json!(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_input(
            "Malformed JSON body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        let reason = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connect"
        } else if e.is_decode() {
            "decode"
        } else {
            "request"
        };

        AppError::store(
            format!("Store request failed: {e}"),
            json!({ "reason": reason }),
        )
    }
}
