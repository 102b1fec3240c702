//! HTTP error mapping.
//!
//! Authentication failures collapse onto a uniform 401 body so responses
//! don't leak whether a token was malformed, expired, or revoked. Refresh
//! failures get their own 401 code so clients know to tear the session
//! down instead of retrying.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use docuvault_authn::AuthError;

use crate::accounts::DirectoryError;

/// API-level errors, each mapping to one status/body combination.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Any access-token failure: missing, malformed, expired, revoked.
    #[error("authentication required")]
    Unauthenticated,

    /// The refresh endpoint refused to rotate the session.
    #[error("refresh rejected")]
    RefreshRejected,

    /// Registration against an existing email.
    #[error("email already registered")]
    EmailTaken,

    /// Login with a bad email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Malformed or incomplete request payload.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Anything the client can't fix. Details go to the log, not the body.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "authentication_required"),
            Self::RefreshRejected => (StatusCode::UNAUTHORIZED, "refresh_rejected"),
            Self::EmailTaken => (StatusCode::CONFLICT, "email_taken"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = match &self {
            Self::BadRequest(message) => json!({ "error": code, "message": message }),
            _ => json!({ "error": code }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            // Store trouble is ours, not the caller's.
            AuthError::KeyStoreError(_) => {
                tracing::error!(%error, "session key store failure");
                Self::Internal
            }
            // Everything else collapses onto the uniform 401.
            _ => {
                tracing::debug!(%error, "request authentication failed");
                Self::Unauthenticated
            }
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::EmailTaken => Self::EmailTaken,
            DirectoryError::InvalidCredentials => Self::InvalidCredentials,
            DirectoryError::Internal { .. } => {
                tracing::error!(%error, "account directory failure");
                Self::Internal
            }
        }
    }
}

/// Maps refresh-endpoint failures: store trouble stays a 500, every other
/// verification failure becomes the terminal `refresh_rejected` 401.
pub fn refresh_error(error: AuthError) -> ApiError {
    match error {
        AuthError::KeyStoreError(_) => {
            tracing::error!(%error, "session key store failure during refresh");
            ApiError::Internal
        }
        _ => {
            tracing::debug!(%error, "refresh rejected");
            ApiError::RefreshRejected
        }
    }
}
