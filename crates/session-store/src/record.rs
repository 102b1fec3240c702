//! Session key record type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, UserId};

/// Public verification key for one login session.
///
/// Stores only the public half of the session's Ed25519 key pair. The
/// private half signs the session's token pair at issuance and is discarded
/// immediately, so a stolen store dump cannot be used to mint tokens.
///
/// # Liveness
///
/// A record is live while it has been written within the store's idle TTL.
/// Both [`put`](crate::SessionKeyStore::put) at login and the upsert during
/// a token refresh stamp `touched_at`, so an actively refreshing client
/// keeps its session alive indefinitely while an abandoned one ages out.
///
/// # Example
///
/// ```
/// use docuvault_session_store::{SessionId, SessionKeyRecord};
///
/// let record = SessionKeyRecord::builder()
///     .user_id(42)
///     .session_id(SessionId::generate())
///     .public_key("hv0kA-c8qUAtc9oWR0flJZRpABw1nTHWIfgrTYN1IFU".to_owned())
///     .build();
///
/// assert_eq!(record.created_at, record.touched_at);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct SessionKeyRecord {
    /// Account the session belongs to.
    #[builder(into)]
    pub user_id: UserId,

    /// Session this key verifies.
    ///
    /// Matches the `sid` claim of every token signed for the session.
    #[builder(into)]
    pub session_id: SessionId,

    /// Ed25519 public key (base64url-encoded, no padding).
    ///
    /// The raw 32-byte public key encoded without padding per RFC 7515,
    /// so a 32-byte key encodes to 43 characters.
    pub public_key: String,

    /// When the session was first established.
    ///
    /// Set once at login and never changes, even across refreshes.
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    ///
    /// Refreshed by every [`put`](crate::SessionKeyStore::put); drives
    /// idle expiry.
    #[builder(default = Utc::now())]
    pub touched_at: DateTime<Utc>,
}

impl SessionKeyRecord {
    /// Returns `true` if the record has sat unwritten for longer than
    /// `idle_ttl` as of `now`.
    #[must_use]
    pub fn is_idle_expired(&self, idle_ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.touched_at > idle_ttl
    }
}
