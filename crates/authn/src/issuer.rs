//! Session issuance, refresh, and logout.

use std::sync::Arc;

use docuvault_session_store::{SessionId, SessionKeyRecord, SessionKeyStore, UserId};

use crate::{
    claims::TokenKind,
    codec::{TokenPair, decode_unverified, sign_pair, verify},
    error::AuthError,
    keys::SessionKeypair,
};

/// A newly established or refreshed session.
#[derive(Clone, Debug)]
pub struct IssuedSession {
    /// The session's identifier (stable across refreshes).
    pub session_id: SessionId,
    /// The freshly signed token pair.
    pub tokens: TokenPair,
}

/// Mints sessions and their token pairs.
///
/// Each login gets its own Ed25519 key pair: the public half is persisted
/// as a [`SessionKeyRecord`], the private half signs exactly one token
/// pair and is then dropped (and zeroized). The issuer itself is therefore
/// stateless; everything lives in the store.
pub struct SessionIssuer {
    store: Arc<dyn SessionKeyStore>,
}

impl SessionIssuer {
    /// Creates an issuer over the given session key store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionKeyStore>) -> Self {
        Self { store }
    }

    /// Establishes a new session for an authenticated account.
    ///
    /// Called after credential verification (which is not this crate's
    /// concern). Generates a key pair, persists the public half, and signs
    /// the session's first token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyStoreError`] if the record cannot be
    /// persisted. No tokens are issued in that case.
    #[tracing::instrument(skip(self))]
    pub async fn issue(&self, user_id: UserId) -> Result<IssuedSession, AuthError> {
        let keypair = SessionKeypair::generate();
        let session_id = SessionId::generate();

        let record = SessionKeyRecord::builder()
            .user_id(user_id)
            .session_id(session_id.clone())
            .public_key(keypair.public_key.clone())
            .build();

        // Persist before signing: a signed token without a stored key
        // would be unverifiable, the reverse is merely an orphan record
        // that ages out.
        self.store.put(&record).await?;

        let tokens = sign_pair(user_id, &session_id, &keypair.pkcs8_der)?;

        tracing::debug!(%user_id, %session_id, "session established");

        Ok(IssuedSession { session_id, tokens })
        // `keypair` drops here; the private key is zeroized.
    }

    /// Exchanges a refresh token for a fresh token pair.
    ///
    /// The refresh token is verified against the session's current key
    /// record, then the session's key pair is rotated: a new key signs the
    /// new pair and replaces the stored public key. The upsert restamps
    /// the record, resetting the idle countdown, and invalidates every
    /// token signed with the previous key — a refresh token works at most
    /// once.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionRevoked`] if no live record exists for the token's session
    /// - [`AuthError::WrongTokenKind`] if an access token was presented
    /// - [`AuthError::TokenExpired`] / [`AuthError::InvalidSignature`] from verification
    /// - [`AuthError::KeyStoreError`] on store failures
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, AuthError> {
        let unverified = decode_unverified(refresh_token)?;

        let record = self
            .store
            .get(unverified.user_id(), unverified.session_id())
            .await?
            .ok_or_else(|| AuthError::session_revoked(unverified.session_id().to_string()))?;

        let identity = verify(refresh_token, &record.public_key, TokenKind::Refresh)?;

        // Rotate: new key pair, same session. Replacing the stored public
        // key kills the presented refresh token along with the rest of
        // the old pair.
        let keypair = SessionKeypair::generate();
        let rotated = SessionKeyRecord::builder()
            .user_id(identity.user_id())
            .session_id(identity.session_id().clone())
            .public_key(keypair.public_key.clone())
            .created_at(record.created_at)
            .build();

        self.store.put(&rotated).await?;

        let tokens = sign_pair(identity.user_id(), identity.session_id(), &keypair.pkcs8_der)?;

        tracing::debug!(
            user_id = %identity.user_id(),
            session_id = %identity.session_id(),
            "session key rotated"
        );

        Ok(IssuedSession { session_id: identity.session_id().clone(), tokens })
    }

    /// Terminates a session by deleting its key record.
    ///
    /// Idempotent: logging out an already-dead session succeeds. Every
    /// outstanding token for the session becomes unverifiable immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyStoreError`] only on store failures.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self, user_id: UserId, session_id: &SessionId) -> Result<(), AuthError> {
        self.store.delete(user_id, session_id).await?;
        tracing::debug!(%user_id, %session_id, "session revoked");
        Ok(())
    }
}
