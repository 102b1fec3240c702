//! Claims and identity types.
//!
//! Two deliberately distinct views of a token exist here:
//!
//! - [`UnverifiedClaims`] — parsed from the payload *before* any signature
//!   check, solely so the verifier knows which session key record to fetch.
//! - [`VerifiedIdentity`] — produced only by signature verification.
//!
//! There is no conversion between the two. Code that needs a caller
//! identity must go through [`verify`](crate::codec::verify), so an
//! unverified payload can never masquerade as an authenticated one.

use serde::{Deserialize, Serialize};

use docuvault_session_store::{SessionId, UserId};

use crate::error::AuthError;

/// Which half of a session's token pair a token is.
///
/// Carried in the `kind` claim and checked during verification, so an
/// access token can never be replayed against the refresh endpoint or
/// vice versa.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived request credential.
    Access,
    /// Long-lived credential exchanged for a new pair.
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims carried by every DocuVault session token.
///
/// Wire shape:
///
/// ```json
/// {
///   "sub": "42",
///   "sid": "6fe1c2b0-7a65-4f7e-9ae1-92f3b6a01c44",
///   "kind": "access",
///   "iat": 1234567800,
///   "exp": 1234568700
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - the account ID as a decimal string.
    pub sub: String,
    /// Session ID minted at login; the key-record lookup key.
    pub sid: String,
    /// Access or refresh.
    pub kind: TokenKind,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Expiration time (seconds since epoch).
    pub exp: u64,
}

impl SessionClaims {
    /// Parses the `sub` claim into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTokenFormat` if `sub` is not a decimal
    /// integer.
    pub fn parse_user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i64>()
            .map(UserId::from)
            .map_err(|_| AuthError::invalid_token_format(format!("sub '{}' is not a valid account ID", self.sub)))
    }
}

/// Claims read from a token payload without signature verification.
///
/// Exists only to drive the session key record lookup. Fields are private
/// and exposed read-only; nothing here may be treated as an authenticated
/// identity.
#[derive(Clone, Debug)]
pub struct UnverifiedClaims {
    user_id: UserId,
    session_id: SessionId,
    kind: TokenKind,
}

impl UnverifiedClaims {
    pub(crate) fn new(user_id: UserId, session_id: SessionId, kind: TokenKind) -> Self {
        Self { user_id, session_id, kind }
    }

    /// The claimed (unverified) account ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The claimed (unverified) session ID.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The claimed (unverified) token kind.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}

/// The authenticated caller of a request.
///
/// Constructed only by [`verify`](crate::codec::verify) after the token's
/// signature has been checked against the session's stored public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    user_id: UserId,
    session_id: SessionId,
}

impl VerifiedIdentity {
    pub(crate) fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self { user_id, session_id }
    }

    /// The authenticated account ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The session the request was authenticated under.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}
