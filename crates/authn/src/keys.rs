//! Per-session Ed25519 key pair generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::{PUBLIC_KEY_LENGTH, SigningKey, VerifyingKey};
use jsonwebtoken::DecodingKey;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::AuthError;

/// A freshly generated Ed25519 key pair for one session.
///
/// The private half lives only long enough to sign the session's token
/// pair; it is wrapped in [`Zeroizing`] so the key bytes are scrubbed from
/// memory on drop. The public half is what gets persisted in the session
/// key record.
pub struct SessionKeypair {
    /// Private key in PKCS#8 DER format (suitable for
    /// [`jsonwebtoken::EncodingKey::from_ed_der`]).
    pub pkcs8_der: Zeroizing<Vec<u8>>,
    /// Public key, base64url-encoded without padding (32 bytes → 43 chars).
    pub public_key: String,
}

impl SessionKeypair {
    /// Generates a fresh random Ed25519 key pair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key_bytes = signing_key.verifying_key().to_bytes();
        let public_key = URL_SAFE_NO_PAD.encode(public_key_bytes);

        // Wrap intermediate private bytes in Zeroizing to scrub from memory on drop.
        let private_bytes: Zeroizing<[u8; 32]> = Zeroizing::new(signing_key.to_bytes());
        let mut pkcs8_der = Zeroizing::new(vec![
            0x30, 0x2e, // SEQUENCE, 46 bytes
            0x02, 0x01, 0x00, // INTEGER version 0
            0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
            0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
            0x04, 0x22, // OCTET STRING, 34 bytes
            0x04, 0x20, // OCTET STRING, 32 bytes (the actual key)
        ]);
        pkcs8_der.extend_from_slice(&*private_bytes);

        Self { pkcs8_der, public_key }
    }
}

/// Converts a stored base64url public key to a jsonwebtoken [`DecodingKey`].
///
/// # Errors
///
/// Returns [`AuthError::InvalidPublicKey`] if the value is not valid
/// base64url, is not exactly 32 bytes, or is not a valid Ed25519 point.
pub fn decoding_key_from_b64(public_key_b64: &str) -> Result<DecodingKey, AuthError> {
    // Decode into a Zeroizing wrapper so the raw key bytes are scrubbed
    // from memory when dropped.
    let public_key_bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
        URL_SAFE_NO_PAD
            .decode(public_key_b64.as_bytes())
            .map_err(|e| AuthError::invalid_public_key(format!("base64 decode: {e}")))?,
    );

    // Ed25519 public keys are exactly 32 bytes.
    if public_key_bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(AuthError::invalid_public_key(format!(
            "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
            public_key_bytes.len()
        )));
    }

    // Validate it's a valid Ed25519 key by parsing it.
    let key_bytes: Zeroizing<[u8; PUBLIC_KEY_LENGTH]> = Zeroizing::new(
        public_key_bytes[..PUBLIC_KEY_LENGTH]
            .try_into()
            .map_err(|_| AuthError::invalid_public_key("failed to convert bytes"))?,
    );

    let _verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| AuthError::invalid_public_key(format!("invalid Ed25519 key: {e}")))?;

    drop(key_bytes);
    drop(public_key_bytes);

    DecodingKey::from_ed_components(public_key_b64)
        .map_err(|e| AuthError::invalid_public_key(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_generate_produces_valid_lengths() {
        let keypair = SessionKeypair::generate();
        // PKCS#8 DER for Ed25519 is 48 bytes (16 header + 32 key)
        assert_eq!(keypair.pkcs8_der.len(), 48);
        // Base64url of 32 bytes = 43 characters (no padding)
        assert_eq!(keypair.public_key.len(), 43);
    }

    #[test]
    fn test_generate_unique_per_call() {
        let a = SessionKeypair::generate();
        let b = SessionKeypair::generate();
        assert_ne!(a.public_key, b.public_key, "each login must get a fresh key pair");
    }

    #[test]
    fn test_decoding_key_from_generated_public_key() {
        let keypair = SessionKeypair::generate();
        assert!(decoding_key_from_b64(&keypair.public_key).is_ok());
    }

    #[rstest]
    #[case::invalid_base64("not-valid!!!")]
    #[case::wrong_length("AAAA")]
    #[case::empty("")]
    fn test_decoding_key_invalid(#[case] bad_key: &str) {
        let result = decoding_key_from_b64(bad_key);
        assert!(matches!(result, Err(AuthError::InvalidPublicKey(_))));
    }
}
