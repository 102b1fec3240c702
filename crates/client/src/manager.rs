//! Session state and the single-flight refresh coordinator.

use std::{future::Future, sync::Arc, time::Duration};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};

use docuvault_authn::TokenPair;

use crate::{
    error::{RefreshError, RequestError, SessionError},
    transport::{DEFAULT_REFRESH_TIMEOUT, RefreshTransport},
};

/// A refresh in flight, shareable across every request waiting on it.
type SharedRefresh = Shared<BoxFuture<'static, Result<TokenPair, RefreshError>>>;

/// Holds the client's current token pair and coordinates refreshes.
///
/// The manager guarantees:
///
/// - at most one refresh call is in flight at any time; concurrent
///   requests that hit an expired token all await the same outcome
/// - a request rejected as unauthorized is retried exactly once after a
///   successful refresh
/// - a failed refresh tears the session down deterministically: tokens are
///   cleared, the signed-out signal fires, and no further refresh traffic
///   is attempted until a new pair is installed
pub struct SessionManager {
    transport: Arc<dyn RefreshTransport>,
    tokens: RwLock<Option<TokenPair>>,
    refresh_slot: Mutex<Option<SharedRefresh>>,
    signed_out: watch::Sender<bool>,
    refresh_timeout: Duration,
}

impl SessionManager {
    /// Creates a manager with no active session.
    #[must_use]
    pub fn new(transport: Arc<dyn RefreshTransport>) -> Self {
        let (signed_out, _) = watch::channel(false);
        Self {
            transport,
            tokens: RwLock::new(None),
            refresh_slot: Mutex::new(None),
            signed_out,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }

    /// Overrides the refresh deadline (default
    /// [`DEFAULT_REFRESH_TIMEOUT`]).
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Seeds the manager with a pair restored from persisted storage, so
    /// an app restart does not force a re-login. The pair may already be
    /// stale; the first unauthorized request will refresh it.
    #[must_use]
    pub fn with_initial_tokens(self, tokens: TokenPair) -> Self {
        *self.tokens.write() = Some(tokens);
        self
    }

    /// Installs a token pair after a successful login, activating the
    /// session and clearing any signed-out state.
    pub fn install(&self, tokens: TokenPair) {
        *self.tokens.write() = Some(tokens);
        self.signed_out.send_replace(false);
        tracing::debug!("session tokens installed");
    }

    /// Tears the session down locally and returns the pair that was
    /// active, so the caller can still hit the server's logout endpoint.
    pub fn sign_out(&self) -> Option<TokenPair> {
        let previous = self.tokens.write().take();
        self.signed_out.send_replace(true);
        tracing::debug!("session signed out");
        previous
    }

    /// Whether the session has been torn down.
    #[must_use]
    pub fn is_signed_out(&self) -> bool {
        *self.signed_out.borrow()
    }

    /// A watch receiver that flips to `true` when the session is torn
    /// down, for UI redirects to the login screen.
    #[must_use]
    pub fn signed_out_watch(&self) -> watch::Receiver<bool> {
        self.signed_out.subscribe()
    }

    /// The current access token.
    ///
    /// # Errors
    ///
    /// [`SessionError::SignedOut`] after teardown,
    /// [`SessionError::NotLoggedIn`] if no pair was ever installed.
    pub fn access_token(&self) -> Result<String, SessionError> {
        if self.is_signed_out() {
            return Err(SessionError::SignedOut);
        }
        self.tokens
            .read()
            .as_ref()
            .map(|pair| pair.access_token.clone())
            .ok_or(SessionError::NotLoggedIn)
    }

    /// Runs an authenticated request, refreshing and retrying once on an
    /// unauthorized response.
    ///
    /// The closure receives the access token to attach and is invoked at
    /// most twice: once with the current token, and once more with a fresh
    /// token if the first attempt came back [`RequestError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotLoggedIn`] / [`SessionError::SignedOut`] if no
    ///   session is active
    /// - [`SessionError::RefreshFailed`] if the refresh triggered by an
    ///   unauthorized response fails (the session is torn down)
    /// - [`SessionError::Unauthorized`] if the retry is rejected too
    /// - [`SessionError::Request`] for non-authentication failures
    pub async fn execute<T, F, Fut>(&self, request: F) -> Result<T, SessionError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let token = self.access_token()?;

        match request(token.clone()).await {
            Ok(value) => Ok(value),
            Err(RequestError::Unauthorized) => {
                let fresh = self.refreshed_token(&token).await?;
                match request(fresh).await {
                    Ok(value) => Ok(value),
                    Err(RequestError::Unauthorized) => Err(SessionError::Unauthorized),
                    Err(RequestError::Other(message)) => Err(SessionError::Request(message)),
                }
            }
            Err(RequestError::Other(message)) => Err(SessionError::Request(message)),
        }
    }

    /// Returns an access token believed to be fresher than `stale_access`,
    /// refreshing if nobody has yet.
    ///
    /// Single-flight: if a refresh is already in flight this awaits its
    /// outcome instead of starting another. If the cached token already
    /// differs from `stale_access`, another request refreshed in the
    /// meantime and the cached token is returned without any network
    /// traffic.
    ///
    /// # Errors
    ///
    /// [`SessionError::RefreshFailed`] when the (shared) refresh fails; the
    /// session is torn down before this returns.
    #[tracing::instrument(skip_all)]
    pub async fn refreshed_token(&self, stale_access: &str) -> Result<String, SessionError> {
        let shared = {
            let mut slot = self.refresh_slot.lock().await;

            if self.is_signed_out() {
                return Err(SessionError::SignedOut);
            }

            // The slot lock serializes this check against refresh
            // completion, so a late caller holding an already-replaced
            // token gets the cached pair instead of forcing a second
            // rotation.
            let refresh_token = {
                let tokens = self.tokens.read();
                let pair = tokens.as_ref().ok_or(SessionError::NotLoggedIn)?;
                if pair.access_token != stale_access {
                    return Ok(pair.access_token.clone());
                }
                pair.refresh_token.clone()
            };

            match &*slot {
                Some(in_flight) => in_flight.clone(),
                None => {
                    let transport = Arc::clone(&self.transport);
                    let timeout = self.refresh_timeout;
                    let flight: SharedRefresh = async move {
                        match tokio::time::timeout(timeout, transport.refresh(&refresh_token))
                            .await
                        {
                            Ok(outcome) => outcome,
                            Err(_) => Err(RefreshError::Timeout),
                        }
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    tracing::debug!("refresh started");
                    flight
                }
            }
        };

        let outcome = shared.clone().await;

        // First waiter back clears the slot and applies the outcome; the
        // ptr_eq check keeps later waiters from clobbering a newer flight.
        {
            let mut slot = self.refresh_slot.lock().await;
            if slot.as_ref().is_some_and(|in_flight| in_flight.ptr_eq(&shared)) {
                *slot = None;
                match &outcome {
                    Ok(pair) => {
                        *self.tokens.write() = Some(pair.clone());
                        tracing::debug!("refresh succeeded, tokens rotated");
                    }
                    Err(error) => {
                        self.tokens.write().take();
                        self.signed_out.send_replace(true);
                        tracing::warn!(%error, "refresh failed, session torn down");
                    }
                }
            }
        }

        match outcome {
            Ok(pair) => Ok(pair.access_token),
            Err(error) => Err(SessionError::RefreshFailed(error)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    fn pair(n: u32) -> TokenPair {
        TokenPair {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
        }
    }

    struct CountingTransport {
        calls: AtomicUsize,
        outcome: Result<TokenPair, RefreshError>,
    }

    impl CountingTransport {
        fn succeeding(next: TokenPair) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), outcome: Ok(next) })
        }

        fn failing(error: RefreshError) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), outcome: Err(error) })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RefreshTransport for CountingTransport {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_access_token_requires_login() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(transport);

        assert_eq!(manager.access_token(), Err(SessionError::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_initial_tokens_restore_a_session() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(transport).with_initial_tokens(pair(1));

        assert_eq!(manager.access_token().expect("token"), "access-1");
        assert!(!manager.is_signed_out());
    }

    #[tokio::test]
    async fn test_install_then_access_token() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(transport);

        manager.install(pair(1));
        assert_eq!(manager.access_token().expect("token"), "access-1");
    }

    #[tokio::test]
    async fn test_sign_out_returns_pair_and_blocks_access() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(transport);
        manager.install(pair(1));

        let previous = manager.sign_out().expect("previous pair");
        assert_eq!(previous.refresh_token, "refresh-1");
        assert_eq!(manager.access_token(), Err(SessionError::SignedOut));
        assert!(manager.is_signed_out());
    }

    #[tokio::test]
    async fn test_refreshed_token_rotates_pair() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(Arc::clone(&transport) as Arc<dyn RefreshTransport>);
        manager.install(pair(1));

        let fresh = manager.refreshed_token("access-1").await.expect("refresh");
        assert_eq!(fresh, "access-2");
        assert_eq!(manager.access_token().expect("token"), "access-2");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_refreshed_token_short_circuits_on_stale_caller() {
        let transport = CountingTransport::succeeding(pair(2));
        let manager = SessionManager::new(Arc::clone(&transport) as Arc<dyn RefreshTransport>);
        manager.install(pair(1));

        manager.refreshed_token("access-1").await.expect("refresh");

        // A caller that still holds the old token must not trigger a
        // second rotation.
        let fresh = manager.refreshed_token("access-1").await.expect("cached");
        assert_eq!(fresh, "access-2");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_tears_session_down() {
        let transport = CountingTransport::failing(RefreshError::rejected("revoked"));
        let manager = SessionManager::new(Arc::clone(&transport) as Arc<dyn RefreshTransport>);
        manager.install(pair(1));

        let result = manager.refreshed_token("access-1").await;
        assert_eq!(
            result,
            Err(SessionError::RefreshFailed(RefreshError::rejected("revoked")))
        );
        assert!(manager.is_signed_out());
        assert_eq!(manager.access_token(), Err(SessionError::SignedOut));

        // Once torn down, nothing reaches the network again.
        let result = manager.refreshed_token("access-1").await;
        assert_eq!(result, Err(SessionError::SignedOut));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reinstall_after_teardown_reactivates() {
        let transport = CountingTransport::failing(RefreshError::Timeout);
        let manager = SessionManager::new(transport);
        manager.install(pair(1));

        let _ = manager.refreshed_token("access-1").await;
        assert!(manager.is_signed_out());

        manager.install(pair(3));
        assert!(!manager.is_signed_out());
        assert_eq!(manager.access_token().expect("token"), "access-3");
    }

    #[tokio::test]
    async fn test_signed_out_watch_fires_on_teardown() {
        let transport = CountingTransport::failing(RefreshError::rejected("revoked"));
        let manager = SessionManager::new(transport);
        manager.install(pair(1));
        let mut watch = manager.signed_out_watch();
        assert!(!*watch.borrow_and_update());

        let _ = manager.refreshed_token("access-1").await;

        watch.changed().await.expect("sender alive");
        assert!(*watch.borrow_and_update());
    }
}
