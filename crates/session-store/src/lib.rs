//! # DocuVault Session Store
//!
//! Server-side storage for per-session verification keys.
//!
//! Every login creates a fresh Ed25519 key pair. The private half signs the
//! session's token pair and is discarded; the public half is persisted here,
//! keyed by `(user_id, session_id)`. Token verification looks the record up
//! on every request, so deleting a record is an immediate, server-side
//! session revocation.
//!
//! Records carry an idle TTL (default 24 hours, see [`DEFAULT_IDLE_TTL`]):
//! each write refreshes the `touched_at` timestamp, and a record that has
//! not been written within the TTL is treated as absent.
//!
//! ## Example
//!
//! ```
//! use docuvault_session_store::{
//!     MemorySessionKeyStore, SessionId, SessionKeyRecord, SessionKeyStore, UserId,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemorySessionKeyStore::new();
//!     let session_id = SessionId::generate();
//!
//!     let record = SessionKeyRecord::builder()
//!         .user_id(42)
//!         .session_id(session_id.clone())
//!         .public_key("hv0kA-c8qUAtc9oWR0flJZRpABw1nTHWIfgrTYN1IFU".to_owned())
//!         .build();
//!
//!     store.put(&record).await?;
//!     assert!(store.get(UserId::from(42), &session_id).await?.is_some());
//!
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Store error types.
pub mod error;
/// Session key record type.
pub mod record;
/// Session key store trait and in-memory implementation.
pub mod store;
/// Identifier newtypes.
pub mod types;

pub use error::{StoreError, StoreResult};
pub use record::SessionKeyRecord;
pub use store::{DEFAULT_IDLE_TTL, MemorySessionKeyStore, SessionKeyStore};
pub use types::{SessionId, UserId};
