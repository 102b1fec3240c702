//! Client-side session error types.

use thiserror::Error;

/// Why a token refresh attempt failed.
///
/// `Clone` because a single refresh outcome is fanned out to every request
/// that was waiting on it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RefreshError {
    /// The server refused to rotate the session (expired, revoked, or
    /// already-used refresh token). Terminal for the session.
    #[error("refresh rejected by server: {reason}")]
    Rejected {
        /// Server-provided rejection reason.
        reason: String,
    },

    /// The refresh request never got a usable response.
    #[error("transport failure during refresh: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The refresh call exceeded the configured deadline.
    #[error("refresh timed out")]
    Timeout,
}

impl RefreshError {
    /// Creates a [`RefreshError::Rejected`] error.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    /// Creates a [`RefreshError::Transport`] error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}

/// How an individual authenticated request failed, as reported by the
/// caller-supplied request closure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    /// The server rejected the presented access token. Triggers the
    /// refresh-and-retry path.
    #[error("request rejected as unauthorized")]
    Unauthorized,

    /// Any non-authentication failure. Passed through unchanged, never
    /// retried.
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced to callers of the session manager.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    /// No token pair has been installed yet.
    #[error("no active session; log in first")]
    NotLoggedIn,

    /// The session was torn down (explicit sign-out or a failed refresh).
    #[error("the session has been signed out")]
    SignedOut,

    /// A refresh was attempted and failed; the session has been torn down.
    #[error("session refresh failed")]
    RefreshFailed(#[source] RefreshError),

    /// The request was still unauthorized after a successful refresh and
    /// one retry.
    #[error("request unauthorized even after token refresh")]
    Unauthorized,

    /// A non-authentication request failure, passed through.
    #[error("request failed: {0}")]
    Request(String),
}
