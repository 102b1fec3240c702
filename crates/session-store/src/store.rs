//! Storage trait for session key records.
//!
//! This module provides the [`SessionKeyStore`] trait that abstracts
//! persistence for per-session verification keys, plus an in-memory
//! implementation for development and testing.
//!
//! # Record Lifecycle
//!
//! ```text
//! ┌─────────┐  put (login)   ┌────────┐  put (refresh)
//! │ absent  │───────────────►│  live  │◄───────────────┐
//! └─────────┘                └───┬────┘────────────────┘
//!      ▲                         │ idle > TTL, or delete (logout)
//!      └─────────────────────────┘
//! ```
//!
//! Expiry is enforced lazily at read time: a record whose `touched_at` is
//! older than the idle TTL is never served, regardless of whether a sweep
//! has physically removed it yet.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::{
    error::StoreResult,
    record::SessionKeyRecord,
    types::{SessionId, UserId},
};

/// Default idle TTL for session key records (24 hours).
///
/// A session whose record has not been written (login or refresh) within
/// this window is treated as revoked.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Persistence layer for session key records.
///
/// Abstracts record storage so production backends and the in-memory test
/// implementation share the same interface.
///
/// # Keying
///
/// All operations address records by `(user_id, session_id)`. One account
/// may hold many concurrent sessions; each has its own record and its own
/// key pair.
///
/// # Error Handling
///
/// Operations return [`StoreResult`] with [`StoreError`](crate::StoreError)
/// variants. Absence is not an error: `get` returns `Ok(None)` and `delete`
/// succeeds on a missing record, so logout stays idempotent.
#[async_trait]
pub trait SessionKeyStore: Send + Sync {
    /// Upserts a session key record.
    ///
    /// Called at login with a fresh record and again on every token
    /// refresh with the rotated public key. Each call stamps `touched_at`
    /// with the current time, resetting the idle countdown. The original
    /// `created_at` survives across upserts.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend is unavailable.
    async fn put(&self, record: &SessionKeyRecord) -> StoreResult<()>;

    /// Retrieves the live record for a session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if the record exists and is within its idle TTL
    /// - `Ok(None)` if the record is absent or idle-expired
    /// - `Err(...)` on storage errors
    ///
    /// An idle-expired record is indistinguishable from a deleted one —
    /// both mean the session is no longer valid.
    async fn get(
        &self,
        user_id: UserId,
        session_id: &SessionId,
    ) -> StoreResult<Option<SessionKeyRecord>>;

    /// Deletes a session key record, revoking the session.
    ///
    /// Idempotent: deleting an absent record succeeds, so repeated logout
    /// requests (or logout racing with idle expiry) never fail.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend is unavailable.
    async fn delete(&self, user_id: UserId, session_id: &SessionId) -> StoreResult<()>;

    /// Lists all live sessions for an account.
    ///
    /// Idle-expired records are excluded. Returns an empty vector for an
    /// account with no sessions.
    async fn list_sessions(&self, user_id: UserId) -> StoreResult<Vec<SessionKeyRecord>>;
}

/// In-memory implementation of [`SessionKeyStore`].
///
/// Stores records in a thread-safe hash map. Suitable for single-process
/// deployments, development, and tests; does not persist across restarts.
///
/// # Expiry
///
/// Reads never serve an idle-expired record (lazy expiry). An optional
/// background sweep (see [`with_sweep_interval`](Self::with_sweep_interval))
/// physically removes expired entries so memory stays bounded in
/// long-running processes.
///
/// # Examples
///
/// ```
/// use docuvault_session_store::{
///     MemorySessionKeyStore, SessionId, SessionKeyRecord, SessionKeyStore, UserId,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySessionKeyStore::new();
///     let session_id = SessionId::generate();
///
///     let record = SessionKeyRecord::builder()
///         .user_id(1)
///         .session_id(session_id.clone())
///         .public_key("hv0kA-c8qUAtc9oWR0flJZRpABw1nTHWIfgrTYN1IFU".to_owned())
///         .build();
///
///     store.put(&record).await?;
///     store.delete(UserId::from(1), &session_id).await?;
///     assert!(store.get(UserId::from(1), &session_id).await?.is_none());
///
///     Ok(())
/// }
/// ```
pub struct MemorySessionKeyStore {
    /// Records indexed by (user_id, session_id).
    records: Arc<RwLock<HashMap<(UserId, String), SessionKeyRecord>>>,
    /// Idle TTL applied to all records.
    idle_ttl: chrono::Duration,
    /// Cancellation token for stopping the background sweep task.
    cancel_token: CancellationToken,
    /// Handle for the background sweep task, if running.
    /// Wrapped in `Mutex` so `shutdown()` can take ownership via `&self`.
    sweep_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Default for MemorySessionKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionKeyStore {
    /// Creates a new empty store with [`DEFAULT_IDLE_TTL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }

    /// Creates a new empty store with a custom idle TTL.
    ///
    /// Mainly useful in tests, where TTLs of a few milliseconds make
    /// expiry observable without waiting.
    #[must_use]
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl: chrono::Duration::from_std(idle_ttl).unwrap_or(chrono::Duration::MAX),
            cancel_token: CancellationToken::new(),
            sweep_handle: Mutex::new(None),
        }
    }

    /// Creates a composite key for the hash map.
    fn make_key(user_id: UserId, session_id: &SessionId) -> (UserId, String) {
        (user_id, session_id.as_str().to_owned())
    }

    /// Physically removes all idle-expired records.
    ///
    /// Returns the number of records removed. Lazy expiry already hides
    /// these records from reads; sweeping only reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| !record.is_idle_expired(self.idle_ttl, now));
        before - records.len()
    }

    /// Returns the number of physically stored records, including any
    /// idle-expired entries not yet swept.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.records.read().len()
    }

    /// Enables a background sweep of expired records at the given interval.
    ///
    /// When enabled, a `tokio::spawn`ed task wakes every `interval` and
    /// calls [`purge_expired`](Self::purge_expired). The task stops when
    /// [`shutdown`](Self::shutdown) is called.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime context.
    #[must_use]
    pub fn with_sweep_interval(self: Arc<Self>, interval: Duration) -> Arc<Self> {
        let store = Arc::clone(&self);
        let token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; consume it so we start
            // with a full interval wait.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("session sweep task shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = store.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "swept idle-expired session records");
                        }
                    }
                }
            }
        });

        *self.sweep_handle.lock() = Some(handle);
        self
    }

    /// Stops the background sweep task, if running.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        let handle = self.sweep_handle.lock().take();
        if let Some(handle) = handle {
            // Best-effort wait; if the task panicked, we just log.
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "session sweep task panicked");
            }
        }
    }
}

#[async_trait]
impl SessionKeyStore for MemorySessionKeyStore {
    #[tracing::instrument(skip(self, record), fields(user_id = %record.user_id, session_id = %record.session_id))]
    async fn put(&self, record: &SessionKeyRecord) -> StoreResult<()> {
        let map_key = Self::make_key(record.user_id, &record.session_id);
        let now = Utc::now();
        let mut records = self.records.write();

        let mut record = record.clone();
        record.touched_at = now;
        // An upsert over a live record keeps the session's original
        // creation time.
        if let Some(existing) = records.get(&map_key) {
            if !existing.is_idle_expired(self.idle_ttl, now) {
                record.created_at = existing.created_at;
            }
        }

        records.insert(map_key, record);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(
        &self,
        user_id: UserId,
        session_id: &SessionId,
    ) -> StoreResult<Option<SessionKeyRecord>> {
        let map_key = Self::make_key(user_id, session_id);
        let now = Utc::now();

        {
            let records = self.records.read();
            match records.get(&map_key) {
                None => return Ok(None),
                Some(record) if !record.is_idle_expired(self.idle_ttl, now) => {
                    return Ok(Some(record.clone()));
                },
                Some(_) => {},
            }
        }

        // The record is idle-expired. Upgrade to a write lock and remove
        // it, re-checking under the lock in case a concurrent put revived
        // the session in between.
        let mut records = self.records.write();
        if let Some(record) = records.get(&map_key) {
            if record.is_idle_expired(self.idle_ttl, now) {
                records.remove(&map_key);
                tracing::debug!(%user_id, %session_id, "removed idle-expired session record");
            } else {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, user_id: UserId, session_id: &SessionId) -> StoreResult<()> {
        let map_key = Self::make_key(user_id, session_id);
        let mut records = self.records.write();
        records.remove(&map_key);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_sessions(&self, user_id: UserId) -> StoreResult<Vec<SessionKeyRecord>> {
        let now = Utc::now();
        let records = self.records.read();

        let live: Vec<SessionKeyRecord> = records
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|(_, record)| record)
            .filter(|record| !record.is_idle_expired(self.idle_ttl, now))
            .cloned()
            .collect();

        Ok(live)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn make_record(user_id: i64, session_id: &SessionId) -> SessionKeyRecord {
        SessionKeyRecord::builder()
            .user_id(user_id)
            .session_id(session_id.clone())
            .public_key("hv0kA-c8qUAtc9oWR0flJZRpABw1nTHWIfgrTYN1IFU".to_owned())
            .build()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("put should succeed");

        let retrieved = store.get(UserId::from(1), &session_id).await.expect("get should succeed");
        let retrieved = retrieved.expect("record should exist");
        assert_eq!(retrieved.user_id, UserId::from(1));
        assert_eq!(retrieved.session_id, session_id);
    }

    #[tokio::test]
    async fn test_get_nonexistent_record() {
        let store = MemorySessionKeyStore::new();

        let result = store.get(UserId::from(1), &SessionId::generate()).await;

        assert!(result.is_ok());
        assert!(result.expect("should not error").is_none());
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("first put");

        let mut rotated = make_record(1, &session_id);
        rotated.public_key = "rotated-public-key".to_owned();
        store.put(&rotated).await.expect("second put");

        let retrieved = store
            .get(UserId::from(1), &session_id)
            .await
            .expect("get")
            .expect("record should exist");
        assert_eq!(retrieved.public_key, "rotated-public-key");
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("first put");
        let original =
            store.get(UserId::from(1), &session_id).await.expect("get").expect("exists");

        tokio::time::sleep(Duration::from_millis(10)).await;
        store.put(&make_record(1, &session_id)).await.expect("second put");

        let updated = store.get(UserId::from(1), &session_id).await.expect("get").expect("exists");
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.touched_at > original.touched_at);
    }

    #[tokio::test]
    async fn test_delete_revokes_session() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("put");
        store.delete(UserId::from(1), &session_id).await.expect("delete");

        let result = store.get(UserId::from(1), &session_id).await.expect("get");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.delete(UserId::from(1), &session_id).await.expect("first delete");
        store.delete(UserId::from(1), &session_id).await.expect("second delete");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_user() {
        let store = MemorySessionKeyStore::new();
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("put");

        // Same session id under a different user id is a different record.
        let result = store.get(UserId::from(2), &session_id).await.expect("get");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_sessions_per_user() {
        let store = MemorySessionKeyStore::new();

        for _ in 0..3 {
            store.put(&make_record(1, &SessionId::generate())).await.expect("put user 1");
        }
        store.put(&make_record(2, &SessionId::generate())).await.expect("put user 2");

        let sessions = store.list_sessions(UserId::from(1)).await.expect("list");
        assert_eq!(sessions.len(), 3);
        assert!(sessions.iter().all(|r| r.user_id == UserId::from(1)));
    }

    #[tokio::test]
    async fn test_list_sessions_empty_user() {
        let store = MemorySessionKeyStore::new();

        let sessions = store.list_sessions(UserId::from(999)).await.expect("list");
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_expired_record_not_served() {
        let store = MemorySessionKeyStore::with_idle_ttl(Duration::from_millis(0));
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("put");
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = store.get(UserId::from(1), &session_id).await.expect("get");
        assert!(result.is_none(), "idle-expired record must not be served");
    }

    #[tokio::test]
    async fn test_get_removes_expired_record() {
        let store = MemorySessionKeyStore::with_idle_ttl(Duration::from_millis(0));
        let session_id = SessionId::generate();

        store.put(&make_record(1, &session_id)).await.expect("put");
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(store.entry_count(), 1);
        let _ = store.get(UserId::from(1), &session_id).await.expect("get");
        assert_eq!(store.entry_count(), 0, "expired record should be removed on read");
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemorySessionKeyStore::with_idle_ttl(Duration::from_millis(10));

        for _ in 0..3 {
            store.put(&make_record(1, &SessionId::generate())).await.expect("put");
        }
        tokio::time::sleep(Duration::from_millis(30)).await;

        let live_session = SessionId::generate();
        store.put(&make_record(2, &live_session)).await.expect("put live");

        let removed = store.purge_expired();
        assert_eq!(removed, 3);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_task_purges_and_shuts_down() {
        let store =
            Arc::new(MemorySessionKeyStore::with_idle_ttl(Duration::from_millis(10)))
                .with_sweep_interval(Duration::from_millis(20));

        store.put(&make_record(1, &SessionId::generate())).await.expect("put");
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(store.entry_count(), 0, "sweep should remove expired records");
        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_puts_same_session() {
        let store = Arc::new(MemorySessionKeyStore::new());
        let session_id = SessionId::generate();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let session_id = session_id.clone();
            handles.push(tokio::spawn(async move {
                store.put(&make_record(1, &session_id)).await
            }));
        }
        for handle in handles {
            handle.await.expect("task").expect("put");
        }

        assert_eq!(store.entry_count(), 1);
    }
}
