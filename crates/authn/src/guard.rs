//! Per-request access token verification.

use std::sync::Arc;

use docuvault_session_store::SessionKeyStore;

use crate::{
    claims::{TokenKind, VerifiedIdentity},
    codec::{decode_unverified, verify},
    error::AuthError,
};

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for a missing header, a different scheme, or an empty
/// token.
#[must_use]
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Verifies access tokens on every request.
///
/// The pipeline is deliberately lookup-first:
///
/// 1. Extract the bearer token
/// 2. Decode claims *without* verifying, to learn `(user_id, session_id)`
/// 3. Fetch the session's key record from the store
/// 4. Verify the signature against the stored public key
///
/// There is no caching in front of the store: a deleted or idle-expired
/// record fails step 3 on the very next request, which is what makes
/// server-side revocation immediate.
pub struct AccessGuard {
    store: Arc<dyn SessionKeyStore>,
}

impl AccessGuard {
    /// Creates a guard over the given session key store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionKeyStore>) -> Self {
        Self { store }
    }

    /// Authenticates a request from its `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if no bearer token is present
    /// - [`AuthError::InvalidTokenFormat`] / [`AuthError::UnsupportedAlgorithm`] for malformed tokens
    /// - [`AuthError::SessionRevoked`] if no live key record exists
    /// - [`AuthError::TokenExpired`] / [`AuthError::InvalidSignature`] /
    ///   [`AuthError::WrongTokenKind`] from signature verification
    /// - [`AuthError::KeyStoreError`] if the store is unreachable
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<VerifiedIdentity, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::Unauthenticated)?;

        let unverified = decode_unverified(token)?;

        let record = self
            .store
            .get(unverified.user_id(), unverified.session_id())
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = %unverified.user_id(),
                    session_id = %unverified.session_id(),
                    error = %e,
                    "session key lookup failed"
                );
                AuthError::key_store_error(e)
            })?
            .ok_or_else(|| AuthError::session_revoked(unverified.session_id().to_string()))?;

        let identity = verify(token, &record.public_key, TokenKind::Access)?;

        tracing::debug!(
            user_id = %identity.user_id(),
            session_id = %identity.session_id(),
            "access token verified"
        );

        Ok(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use docuvault_session_store::{MemorySessionKeyStore, UserId};
    use rstest::rstest;

    use super::*;
    use crate::issuer::SessionIssuer;

    fn guard_and_issuer() -> (AccessGuard, SessionIssuer) {
        let store = Arc::new(MemorySessionKeyStore::new());
        (
            AccessGuard::new(Arc::clone(&store) as Arc<dyn SessionKeyStore>),
            SessionIssuer::new(store as Arc<dyn SessionKeyStore>),
        )
    }

    #[rstest]
    #[case::present(Some("Bearer abc"), Some("abc"))]
    #[case::missing(None, None)]
    #[case::wrong_scheme(Some("Basic abc"), None)]
    #[case::empty_token(Some("Bearer "), None)]
    #[case::whitespace_token(Some("Bearer    "), None)]
    fn test_bearer_token(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(bearer_token(header), expected);
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        let (guard, issuer) = guard_and_issuer();
        let session = issuer.issue(UserId::from(9)).await.expect("issue");

        let bearer = format!("Bearer {}", session.tokens.access_token);
        let identity = guard.authenticate(Some(&bearer)).await.expect("authenticate");

        assert_eq!(identity.user_id(), UserId::from(9));
        assert_eq!(identity.session_id(), &session.session_id);
    }

    #[tokio::test]
    async fn test_authenticate_missing_header() {
        let (guard, _) = guard_and_issuer();

        let result = guard.authenticate(None).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_authenticate_garbage_token() {
        let (guard, _) = guard_and_issuer();

        let result = guard.authenticate(Some("Bearer not-a-jwt")).await;
        assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_refresh_token() {
        let (guard, issuer) = guard_and_issuer();
        let session = issuer.issue(UserId::from(1)).await.expect("issue");

        let bearer = format!("Bearer {}", session.tokens.refresh_token);
        let result = guard.authenticate(Some(&bearer)).await;
        assert!(matches!(result, Err(AuthError::WrongTokenKind { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_after_logout() {
        let (guard, issuer) = guard_and_issuer();
        let session = issuer.issue(UserId::from(1)).await.expect("issue");
        issuer.logout(UserId::from(1), &session.session_id).await.expect("logout");

        let bearer = format!("Bearer {}", session.tokens.access_token);
        let result = guard.authenticate(Some(&bearer)).await;
        assert!(matches!(result, Err(AuthError::SessionRevoked { .. })));
    }
}
