//! Transport abstraction for the token refresh call.

use std::time::Duration;

use async_trait::async_trait;
use docuvault_authn::TokenPair;

use crate::error::RefreshError;

/// Upper bound on a single refresh round-trip before the session manager
/// gives up and tears the session down.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// The one network call the session manager performs itself.
///
/// Implementations exchange a refresh token for a new token pair against
/// the server's refresh endpoint. Everything else (the actual API
/// requests) stays with the caller; the manager only decides *when* a
/// refresh happens and shares its outcome.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchanges `refresh_token` for a fresh token pair.
    ///
    /// # Errors
    ///
    /// - [`RefreshError::Rejected`] when the server refuses the token
    /// - [`RefreshError::Transport`] when no usable response arrived
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError>;
}
