//! Shared application state.

use std::sync::Arc;

use docuvault_authn::{AccessGuard, SessionIssuer};
use docuvault_session_store::SessionKeyStore;

use crate::accounts::AccountDirectory;

/// Everything the handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Mints sessions and rotates their keys.
    pub issuer: Arc<SessionIssuer>,
    /// Verifies access tokens on every request.
    pub guard: Arc<AccessGuard>,
    /// Account records and credential checks.
    pub accounts: Arc<dyn AccountDirectory>,
}

impl AppState {
    /// Wires the issuer and guard over one session key store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionKeyStore>, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self {
            issuer: Arc::new(SessionIssuer::new(Arc::clone(&store))),
            guard: Arc::new(AccessGuard::new(store)),
            accounts,
        }
    }
}
