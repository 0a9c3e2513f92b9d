//! API error type and its HTTP mapping.

use crate::response::ApiResponse;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use warrant_credential::CredentialError;
use warrant_store::StoreError;
use warrant_token::TokenError;

/// Message returned for every rejected token unless token errors are exposed.
pub const GENERIC_TOKEN_MESSAGE: &str = "invalid or expired token";

/// Errors returned from API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or the body is unreadable.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, rejected or unsuitable credentials.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl ApiError {
    /// Map a token verification failure to a 401.
    ///
    /// With `expose` unset every rejection carries the same message.
    pub fn rejected_token(err: TokenError, expose: bool) -> Self {
        if !err.is_rejection() {
            return ApiError::Token(err);
        }
        if expose {
            ApiError::Unauthorized(err.to_string())
        } else {
            ApiError::Unauthorized(GENERIC_TOKEN_MESSAGE.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Conflict(_) | ApiError::Store(StoreError::AlreadyExists(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Token(_) | ApiError::Credential(_) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the log.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(
            ApiError::from(StoreError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::AlreadyExists("x".into())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_token_rejections_collapse() {
        let expired = ApiError::rejected_token(TokenError::TokenExpired { expired_at: 1 }, false);
        let forged = ApiError::rejected_token(TokenError::InvalidSignature, false);
        assert_eq!(expired.to_string(), forged.to_string());
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_rejections_exposed() {
        let expired = ApiError::rejected_token(TokenError::TokenExpired { expired_at: 1 }, true);
        assert!(expired.to_string().contains("expired"));
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_local_token_failure_is_internal() {
        let err = ApiError::rejected_token(TokenError::InvalidSecret("empty".into()), true);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
