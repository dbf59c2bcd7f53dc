//! JSON error responses.
//!
//! Every failing API route answers `{ "error": string }` with a status code.
//! Service errors are converted here, and this is where they get logged:
//! `error!` for server faults, `warn!` for upstream and limit failures.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::llm::LlmError;
use crate::rate_limit::RateLimitError;
use crate::services::account::AccountError;
use crate::services::content::ContentError;

pub const UNAUTHORIZED: &str = "Unauthorized";
pub const UNEXPECTED: &str = "An unexpected error occurred.";
const PROVIDER_FALLBACK: &str = "OpenAI API error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database query failed");
        Self::internal("Database error")
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        tracing::error!(error = %e, "content query failed");
        Self::internal("Failed to load content")
    }
}

impl From<RateLimitError> for ApiError {
    fn from(e: RateLimitError) -> Self {
        tracing::warn!(error = ?e, "rate limit hit");
        Self::new(StatusCode::TOO_MANY_REQUESTS, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let status = match &e {
            AccountError::InvalidEmail
            | AccountError::WeakPassword
            | AccountError::InvalidCode
            | AccountError::VerificationFailed => StatusCode::BAD_REQUEST,
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::EmailNotConfirmed => StatusCode::FORBIDDEN,
            AccountError::PasswordHash(_) | AccountError::Database(_) => {
                tracing::error!(error = %e, "account operation failed");
                return Self::internal(UNEXPECTED);
            }
        };
        Self::new(status, e.to_string())
    }
}

/// A provider's non-success status passes through with its own message.
/// Everything else is a 500 carrying the error text.
impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        if let LlmError::ApiResponse { status, .. } = &e {
            tracing::warn!(status, error = %e, "completion provider rejected request");
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            let message = e.provider_message().unwrap_or_else(|| PROVIDER_FALLBACK.to_owned());
            return Self::new(status, message);
        }
        tracing::error!(error = %e, "completion call failed");
        let message = e.to_string();
        if message.trim().is_empty() { Self::internal(UNEXPECTED) } else { Self::internal(message) }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
