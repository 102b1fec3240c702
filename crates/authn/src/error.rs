//! Authentication error types.
//!
//! This module defines errors that can occur during token issuance,
//! verification, and session key lookup.

use thiserror::Error;

use crate::claims::TokenKind;

/// Authentication and session errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No credential was presented.
    #[error("Authentication required")]
    Unauthenticated,

    /// Malformed JWT - cannot be decoded.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Algorithm not in allowed list.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Required claim is missing or empty.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// Token is the wrong kind for the operation (e.g., an access token
    /// presented at the refresh endpoint).
    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongTokenKind {
        /// The kind the operation requires.
        expected: TokenKind,
        /// The kind the token carried.
        actual: TokenKind,
    },

    /// No live session key record exists for the token's session.
    ///
    /// Covers logout, idle expiry, and refresh rotation alike — once the
    /// record is gone or replaced, every token signed with the old key
    /// lands here.
    #[error("Session expired or revoked: {session_id}")]
    SessionRevoked {
        /// Session ID with no live record.
        session_id: String,
    },

    /// Invalid public key material in a session key record.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Storage backend error during session key lookup.
    ///
    /// Wraps the original [`StoreError`] to preserve the full error source
    /// chain for debugging and structured logging. Unlike the variants
    /// above, this does not say anything about the token itself.
    ///
    /// [`StoreError`]: docuvault_session_store::StoreError
    #[error("Session store error: {0}")]
    KeyStoreError(
        /// The underlying store error that caused the lookup to fail.
        #[source]
        docuvault_session_store::StoreError,
    ),
}

impl AuthError {
    /// Creates a new `InvalidTokenFormat` error.
    #[must_use]
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }

    /// Creates a new `TokenExpired` error.
    #[must_use]
    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    /// Creates a new `InvalidSignature` error.
    #[must_use]
    pub fn invalid_signature() -> Self {
        Self::InvalidSignature
    }

    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(message.into())
    }

    /// Creates a new `MissingClaim` error for the given claim name.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim(claim.into())
    }

    /// Creates a new `WrongTokenKind` error.
    #[must_use]
    pub fn wrong_token_kind(expected: TokenKind, actual: TokenKind) -> Self {
        Self::WrongTokenKind { expected, actual }
    }

    /// Creates a new `SessionRevoked` error for the given session.
    #[must_use]
    pub fn session_revoked(session_id: impl Into<String>) -> Self {
        Self::SessionRevoked { session_id: session_id.into() }
    }

    /// Creates a new `InvalidPublicKey` error.
    #[must_use]
    pub fn invalid_public_key(message: impl Into<String>) -> Self {
        Self::InvalidPublicKey(message.into())
    }

    /// Creates a new `KeyStoreError` wrapping a store error.
    #[must_use]
    pub fn key_store_error(err: docuvault_session_store::StoreError) -> Self {
        Self::KeyStoreError(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken => {
                AuthError::InvalidTokenFormat("Invalid JWT structure".into())
            },
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAlgorithm => {
                AuthError::UnsupportedAlgorithm("Algorithm not supported".into())
            },
            _ => AuthError::InvalidTokenFormat(format!("JWT error: {}", err)),
        }
    }
}

impl From<docuvault_session_store::StoreError> for AuthError {
    fn from(err: docuvault_session_store::StoreError) -> Self {
        AuthError::KeyStoreError(err)
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
