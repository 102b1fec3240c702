//! Shared test utilities for session authentication testing.
//!
//! This module provides helpers for generating session key pairs, signing
//! tokens with arbitrary timestamps (for expiry testing), crafting raw JWT
//! strings (for attack testing), and building session key records. It is
//! feature-gated behind `testutil` to prevent leaking into production
//! builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! docuvault-authn = { path = "../authn", features = ["testutil"] }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;

use docuvault_session_store::{SessionId, SessionKeyRecord};

use crate::{claims::TokenKind, keys::SessionKeypair};

/// Generates a session key pair together with its store record.
///
/// The record is live (freshly stamped) and ready to be `put` into a
/// session key store; the key pair's private half can sign tokens that
/// verify against it.
pub fn create_session_record(user_id: i64, session_id: &SessionId) -> (SessionKeypair, SessionKeyRecord) {
    let keypair = SessionKeypair::generate();
    let record = SessionKeyRecord::builder()
        .user_id(user_id)
        .session_id(session_id.clone())
        .public_key(keypair.public_key.clone())
        .build();
    (keypair, record)
}

/// Signs a single session token with explicit timestamps.
///
/// Unlike [`sign_pair`](crate::codec::sign_pair), the caller controls
/// `iat` and `exp`, which makes expiry-boundary and stale-token cases
/// testable without sleeping.
///
/// # Panics
///
/// Panics if JWT encoding fails (should not happen with valid inputs).
pub fn sign_token_with_timestamps(
    pkcs8_der: &[u8],
    user_id: i64,
    session_id: &SessionId,
    kind: TokenKind,
    iat: u64,
    exp: u64,
) -> String {
    let claims = json!({
        "sub": user_id.to_string(),
        "sid": session_id.to_string(),
        "kind": kind.to_string(),
        "iat": iat,
        "exp": exp,
    });

    let header = Header::new(Algorithm::EdDSA);
    let encoding_key = EncodingKey::from_ed_der(pkcs8_der);
    jsonwebtoken::encode(&header, &claims, &encoding_key).expect("Failed to encode test JWT")
}

/// Signs an access token that expired `seconds_ago` seconds ago.
///
/// # Panics
///
/// Panics if JWT encoding fails.
pub fn sign_expired_access_token(
    pkcs8_der: &[u8],
    user_id: i64,
    session_id: &SessionId,
    seconds_ago: u64,
) -> String {
    let now = Utc::now().timestamp() as u64;
    sign_token_with_timestamps(
        pkcs8_der,
        user_id,
        session_id,
        TokenKind::Access,
        now.saturating_sub(seconds_ago + 900),
        now.saturating_sub(seconds_ago),
    )
}

/// Creates a raw JWT string from arbitrary header and payload JSON.
///
/// The resulting JWT has the structure `{header_b64}.{payload_b64}.`
/// with an empty signature. This is useful for testing rejection of
/// malformed or attack JWTs (e.g., `alg: "none"`, algorithm confusion).
///
/// # Panics
///
/// Panics if JSON serialization fails.
pub fn craft_raw_jwt(header_json: &serde_json::Value, payload_json: &serde_json::Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header_json).expect("header json"));
    let payload_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload_json).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// Asserts that a [`Result<T, AuthError>`] is an `Err` matching the given
/// [`AuthError`](crate::error::AuthError) variant.
///
/// Works with any `AuthError` variant. On failure, prints the expected
/// variant and the actual result for debugging.
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "expected AuthError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "{}: expected AuthError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_record_matches_keypair() {
        let session_id = SessionId::generate();
        let (keypair, record) = create_session_record(1, &session_id);
        assert_eq!(record.public_key, keypair.public_key);
        assert_eq!(record.session_id, session_id);
    }

    #[test]
    fn test_sign_token_with_timestamps_three_parts() {
        let session_id = SessionId::generate();
        let (keypair, _) = create_session_record(1, &session_id);
        let token = sign_token_with_timestamps(
            &keypair.pkcs8_der,
            1,
            &session_id,
            TokenKind::Access,
            0,
            u64::MAX,
        );
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3, "JWT should have header.payload.signature");
        assert!(!parts[2].is_empty(), "signature should not be empty");
    }

    #[test]
    fn test_craft_raw_jwt_format() {
        let header = json!({"alg": "none", "typ": "JWT"});
        let payload = json!({"sub": "1", "sid": "s"});
        let jwt = craft_raw_jwt(&header, &payload);
        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].is_empty(), "signature should be empty for raw JWTs");
    }

    #[test]
    fn test_assert_auth_error_macro() {
        use crate::error::AuthError;
        let result: Result<(), AuthError> = Err(AuthError::token_expired());
        assert_auth_error!(result, TokenExpired);
        let result: Result<(), AuthError> = Err(AuthError::session_revoked("s"));
        assert_auth_error!(result, SessionRevoked, "revoked session");
    }
}
