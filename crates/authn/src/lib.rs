//! # DocuVault Authentication
//!
//! Per-session JWT issuance and verification.
//!
//! This crate provides:
//! - **Session issuance**: a fresh Ed25519 key pair per login, private half
//!   discarded after signing, public half persisted in the session store
//! - **Token codec**: EdDSA-signed access/refresh token pairs bound to one
//!   session via the `sid` claim
//! - **Access guard**: per-request verification that looks the session's
//!   public key up in the store, so revocation is immediate
//! - **Algorithm validation**: only EdDSA is accepted; symmetric algorithms
//!   and `none` are always rejected
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use docuvault_authn::{AccessGuard, SessionIssuer};
//! use docuvault_session_store::MemorySessionKeyStore;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemorySessionKeyStore::new());
//! let issuer = SessionIssuer::new(Arc::clone(&store) as _);
//! let guard = AccessGuard::new(store as _);
//!
//! let session = issuer.issue(42.into()).await?;
//! let bearer = format!("Bearer {}", session.tokens.access_token);
//!
//! let identity = guard.authenticate(Some(&bearer)).await?;
//! assert_eq!(i64::from(identity.user_id()), 42);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Claims and identity types.
pub mod claims;
/// Token signing, decoding, and verification.
pub mod codec;
/// Authentication error types.
pub mod error;
/// Per-request access token verification.
pub mod guard;
/// Session issuance, refresh, and logout.
pub mod issuer;
/// Per-session key pair generation.
pub mod keys;
/// Shared test utilities (feature-gated).
#[cfg(feature = "testutil")]
pub mod testutil;
/// Algorithm validation.
pub mod validation;

// Re-export key types for convenience
pub use claims::{SessionClaims, TokenKind, UnverifiedClaims, VerifiedIdentity};
pub use codec::{ACCESS_TOKEN_TTL, EXPIRY_LEEWAY, REFRESH_TOKEN_TTL, TokenPair};
pub use error::{AuthError, Result};
pub use guard::AccessGuard;
pub use issuer::{IssuedSession, SessionIssuer};
pub use validation::{ACCEPTED_ALGORITHMS, FORBIDDEN_ALGORITHMS, validate_algorithm};
