//! Authentication error type shared by the pipeline and the HTTP surface

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::core::auth::jwt::TokenError;

/// Authentication service error types.
///
/// Every credential failure collapses into `InvalidCredentials` so callers
/// cannot tell a bad email from a bad password or a store outage.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session revoked")]
    SessionRevoked,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::InvalidToken | TokenError::DecodingError(_) => {
                AuthError::Unauthenticated
            }
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AuthError::SessionRevoked => (StatusCode::UNAUTHORIZED, "SESSION_REVOKED"),
            AuthError::InternalError(detail) => {
                tracing::error!("Auth error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            AuthError::InternalError(_) => "Internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            format!("{}", AuthError::InvalidCredentials),
            "Invalid credentials"
        );
        assert_eq!(format!("{}", AuthError::Unauthenticated), "Not authenticated");
        assert_eq!(format!("{}", AuthError::SessionRevoked), "Session revoked");
    }

    #[test]
    fn test_auth_error_from_token_error() {
        let err: AuthError = TokenError::Expired.into();
        assert!(matches!(err, AuthError::Unauthenticated));

        let err: AuthError = TokenError::InvalidToken.into();
        assert!(matches!(err, AuthError::Unauthenticated));

        let err: AuthError = TokenError::EncodingError("boom".to_string()).into();
        assert!(matches!(err, AuthError::InternalError(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::SessionRevoked.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InternalError("db down".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("Invalid credentials", "INVALID_CREDENTIALS");
        let json = serde_json::to_string(&error).unwrap();

        assert_eq!(
            json,
            r#"{"error":"Invalid credentials","code":"INVALID_CREDENTIALS"}"#
        );
    }
}
