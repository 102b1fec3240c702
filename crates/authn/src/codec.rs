//! Token signing, decoding, and verification.
//!
//! A session's tokens are ordinary JWTs signed with the session's own
//! Ed25519 key. Verification is a two-step pipeline:
//!
//! 1. [`decode_unverified`] reads the payload *without* checking the
//!    signature, to learn which `(user_id, session_id)` key record to fetch
//! 2. [`verify`] checks the signature against that record's public key and
//!    only then yields a [`VerifiedIdentity`]
//!
//! # Example
//!
//! ```
//! use docuvault_authn::codec::{decode_unverified, sign_pair, verify};
//! use docuvault_authn::{TokenKind, keys::SessionKeypair};
//! use docuvault_session_store::SessionId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let keypair = SessionKeypair::generate();
//! let session_id = SessionId::generate();
//!
//! let pair = sign_pair(42.into(), &session_id, &keypair.pkcs8_der)?;
//!
//! let unverified = decode_unverified(&pair.access_token)?;
//! let identity = verify(&pair.access_token, &keypair.public_key, TokenKind::Access)?;
//! assert_eq!(identity.user_id(), unverified.user_id());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};

use docuvault_session_store::{SessionId, UserId};

use crate::{
    claims::{SessionClaims, TokenKind, UnverifiedClaims, VerifiedIdentity},
    error::AuthError,
    keys::decoding_key_from_b64,
    validation::validate_algorithm,
};

/// Access token lifetime (15 minutes).
///
/// Short enough that a leaked access token is only briefly useful; the
/// refresh flow renews it transparently.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime (7 days).
///
/// The outer bound on a session's life without re-login. The store's idle
/// TTL (24 hours) usually expires an inactive session first.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Clock-skew tolerance applied to expiry checks (30 seconds).
///
/// A token whose `exp` passed less than this long ago still verifies.
/// Thirty seconds covers realistic clock drift between servers without
/// materially extending the access-token lifetime.
pub const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// One session's pair of signed tokens.
///
/// Both tokens carry the same `sid` and were signed by the same session
/// key, so they live and die together: a refresh replaces the pair, and a
/// revocation kills the pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived request credential.
    pub access_token: String,
    /// Long-lived credential for the refresh endpoint.
    pub refresh_token: String,
}

/// Signs a fresh access/refresh pair for a session.
///
/// # Arguments
///
/// * `user_id` - Account the session belongs to
/// * `session_id` - Session ID carried as the `sid` claim of both tokens
/// * `pkcs8_der` - The session's Ed25519 private key in PKCS#8 DER format
///
/// # Errors
///
/// Returns an error if JWT encoding fails (malformed key material).
pub fn sign_pair(
    user_id: UserId,
    session_id: &SessionId,
    pkcs8_der: &[u8],
) -> Result<TokenPair, AuthError> {
    let now = Utc::now().timestamp() as u64;
    let header = Header::new(Algorithm::EdDSA);
    let encoding_key = EncodingKey::from_ed_der(pkcs8_der);

    let sign = |kind: TokenKind, ttl: Duration| -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            kind,
            iat: now,
            exp: now + ttl.as_secs(),
        };
        Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
    };

    Ok(TokenPair {
        access_token: sign(TokenKind::Access, ACCESS_TOKEN_TTL)?,
        refresh_token: sign(TokenKind::Refresh, REFRESH_TOKEN_TTL)?,
    })
}

/// Decodes a token's claims without verifying its signature.
///
/// This is the first verification step: the result tells the caller which
/// session key record to fetch and nothing more. The algorithm header is
/// validated here so forbidden algorithms are rejected before any store
/// traffic.
///
/// # Errors
///
/// Returns an error if:
/// - The JWT does not have exactly 3 parts
/// - The header or payload cannot be decoded
/// - The algorithm is not in [`ACCEPTED_ALGORITHMS`](crate::ACCEPTED_ALGORITHMS)
/// - Required claims (`sub`, `sid`) are missing or empty
/// - `sub` is not a decimal account ID
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, AuthError> {
    let header = decode_header(token)
        .map_err(|e| AuthError::invalid_token_format(format!("Failed to decode JWT header: {}", e)))?;

    // Validate algorithm: only EdDSA is accepted (see ACCEPTED_ALGORITHMS)
    validate_algorithm(algorithm_name(header.alg))?;

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::invalid_token_format("JWT must have 3 parts separated by dots"));
    }

    // Decode payload (part 1) using base64 URL-safe encoding
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|e| {
        AuthError::invalid_token_format(format!("Failed to decode JWT payload: {}", e))
    })?;

    // Parse as JSON
    let claims: SessionClaims = serde_json::from_slice(&payload_bytes).map_err(|e| {
        AuthError::invalid_token_format(format!("Failed to parse JWT claims: {}", e))
    })?;

    // Validate required claims are present
    if claims.sub.is_empty() {
        return Err(AuthError::missing_claim("sub"));
    }
    if claims.sid.is_empty() {
        return Err(AuthError::missing_claim("sid"));
    }

    let user_id = claims.parse_user_id()?;

    Ok(UnverifiedClaims::new(user_id, SessionId::from(claims.sid), claims.kind))
}

/// Maps a parsed header algorithm to its RFC 7518 name for policy checks.
///
/// The match is exhaustive so a new `Algorithm` variant in the JWT library
/// is a compile error here rather than a silently unmatched name.
fn algorithm_name(alg: Algorithm) -> &'static str {
    match alg {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::EdDSA => "EdDSA",
    }
}

/// Verifies a token's signature against a session's stored public key.
///
/// Expiry is validated with [`EXPIRY_LEEWAY`] of clock-skew tolerance.
/// The `kind` claim must match `expected_kind`, so an access token cannot
/// be replayed at the refresh endpoint or vice versa.
///
/// # Arguments
///
/// * `token` - The JWT to verify
/// * `public_key_b64` - The session's stored public key (base64url)
/// * `expected_kind` - Which half of the pair the operation requires
///
/// # Errors
///
/// Returns an error if:
/// - The public key material is invalid ([`AuthError::InvalidPublicKey`])
/// - The signature does not match ([`AuthError::InvalidSignature`])
/// - The token expired beyond the leeway ([`AuthError::TokenExpired`])
/// - The token is the wrong kind ([`AuthError::WrongTokenKind`])
pub fn verify(
    token: &str,
    public_key_b64: &str,
    expected_kind: TokenKind,
) -> Result<VerifiedIdentity, AuthError> {
    let decoding_key = decoding_key_from_b64(public_key_b64)?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.leeway = EXPIRY_LEEWAY.as_secs();
    validation.validate_exp = true;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)?;
    let claims = token_data.claims;

    if claims.kind != expected_kind {
        return Err(AuthError::wrong_token_kind(expected_kind, claims.kind));
    }

    let user_id = claims.parse_user_id()?;

    Ok(VerifiedIdentity::new(user_id, SessionId::from(claims.sid)))
}
