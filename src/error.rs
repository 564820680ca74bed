//! Faucet error types with HTTP status code mapping.
//!
//! [`FaucetError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Cooldown rejections are not errors: they are a normal claim outcome
//! (see [`crate::service::ClaimOutcome`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::TelegramId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "user not registered: 42",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State/Not Found | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal / 503         |
/// | 4000–4999 | Data integrity  | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum FaucetError {
    /// No account exists for the given messaging identity.
    #[error("user not registered: {0}")]
    NotRegistered(TelegramId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The user's level has no payout tier.
    #[error("invalid level {level}: payout table covers levels 1..={max_level}")]
    InvalidLevel {
        /// Level found on the user record.
        level: u32,
        /// Highest configured level.
        max_level: u32,
    },

    /// Payout table or other configuration is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Store unavailable or the claim transaction could not commit.
    #[error("persistence error: {0}")]
    PersistenceError(String),
}

impl FaucetError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotRegistered(_) => 2001,
            Self::PersistenceError(_) => 3001,
            Self::InvalidConfig(_) => 3002,
            Self::InvalidLevel { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotRegistered(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidLevel { .. } | Self::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if the caller may safely retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceError(_))
    }
}

impl From<sqlx::Error> for FaucetError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for FaucetError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_registered_maps_to_404() {
        let err = FaucetError::NotRegistered(TelegramId::new(7));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert!(!err.is_retryable());
    }

    #[test]
    fn persistence_error_is_retryable() {
        let err = FaucetError::PersistenceError("connection reset".to_string());
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_level_message_names_range() {
        let err = FaucetError::InvalidLevel {
            level: 9,
            max_level: 8,
        };
        assert_eq!(
            err.to_string(),
            "invalid level 9: payout table covers levels 1..=8"
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
