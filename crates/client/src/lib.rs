//! # DocuVault Client Session
//!
//! Client-side session state and refresh coordination.
//!
//! The [`SessionManager`] owns the token pair handed out at login and
//! wraps authenticated requests:
//!
//! - an unauthorized response triggers a token refresh and exactly one
//!   retry of the original request
//! - concurrent unauthorized responses share a single refresh call
//!   (single-flight), so a burst of requests after token expiry produces
//!   one rotation, not a stampede
//! - a failed refresh tears the session down: tokens are dropped, a
//!   signed-out signal fires, and no further refresh traffic is attempted
//!
//! The actual HTTP layer stays with the caller; the manager only needs a
//! [`RefreshTransport`] for the one call it makes itself.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Client-side session error types.
pub mod error;
/// Session state and the single-flight refresh coordinator.
pub mod manager;
/// Transport abstraction for the refresh call.
pub mod transport;

pub use error::{RefreshError, RequestError, SessionError};
pub use manager::SessionManager;
pub use transport::{DEFAULT_REFRESH_TIMEOUT, RefreshTransport};
