//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4003,
///     "message": "invalid or expired token",
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
    /// Numeric error code (see code ranges on [`GatewayError`]).
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
/// | Range     | Category       | HTTP Status                  |
/// |-----------|----------------|------------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request              |
/// | 2000–2999 | Not Found      | 404 Not Found                |
/// | 3000–3999 | Server         | 500 Internal Server Error    |
/// | 4000–4999 | Auth           | 401 / 403 / 409              |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No registered connection bucket exists for the logical identity.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// The identity exists but has no connection with the given device ID.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// No user row matches the requested ID or email.
    #[error("user not found")]
    UserNotFound,

    /// Request carried no credentials at all.
    ///
    /// The identity resolver treats this as the guest-fallback trigger; it
    /// only surfaces as an HTTP error on routes that require authentication.
    #[error("no credentials supplied")]
    NoCredentials,

    /// The `Authorization` header was present but not a two-part
    /// `Bearer <token>` value.
    #[error("unexpected authorization header")]
    UnexpectedAuthHeader,

    /// Token failed validation (bad signature, expired, or malformed claims).
    #[error("invalid or expired token")]
    InvalidToken,

    /// Wrong email or password on login.
    #[error("wrong email or password")]
    InvalidCredentials,

    /// The caller is authenticated but lacks the required role.
    #[error("insufficient permissions")]
    Forbidden,

    /// Signup with an email that already has an account.
    #[error("email already registered")]
    EmailTaken,

    /// Payload could not be serialized before dispatch.
    #[error("serialization failed: {0}")]
    SerializationFailure(String),

    /// Outbound write to a live connection failed (closed or broken).
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::IdentityNotFound(_) => 2001,
            Self::DeviceNotFound(_) => 2002,
            Self::UserNotFound => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::SerializationFailure(_) => 3002,
            Self::DeliveryFailed(_) => 3003,
            Self::NoCredentials => 4001,
            Self::UnexpectedAuthHeader => 4002,
            Self::InvalidToken => 4003,
            Self::InvalidCredentials => 4004,
            Self::Forbidden => 4005,
            Self::EmailTaken => 4006,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::IdentityNotFound(_) | Self::DeviceNotFound(_) | Self::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::NoCredentials | Self::UnexpectedAuthHeader | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::SerializationFailure(_)
            | Self::DeliveryFailed(_)
            | Self::PersistenceError(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
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
    fn auth_errors_map_to_unauthorized() {
        assert_eq!(
            GatewayError::NoCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::UnexpectedAuthHeader.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let err = GatewayError::IdentityNotFound("user-1".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);

        let err = GatewayError::DeviceNotFound("user-1-abc".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2002);
    }

    #[test]
    fn email_taken_is_conflict() {
        assert_eq!(GatewayError::EmailTaken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn dispatch_errors_are_server_side() {
        let err = GatewayError::SerializationFailure("bad payload".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = GatewayError::DeliveryFailed("channel closed".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
