//! # DocuVault Server
//!
//! HTTP API for accounts and session lifecycle:
//!
//! - `POST /auth/register` — create an account, open its first session
//! - `POST /auth/login` — verify credentials, open a session
//! - `POST /auth/refresh-token` — rotate a session's token pair
//! - `POST /auth/logout` — revoke the caller's session
//! - `GET /auth/me` — identify the caller
//!
//! Sessions are backed by [`docuvault_session_store`] and tokens by
//! [`docuvault_authn`]; this crate only adds the HTTP surface and the
//! account directory.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Account records and credential verification.
pub mod accounts;
/// HTTP error mapping.
pub mod error;
/// Request extractors.
pub mod extract;
/// HTTP handlers.
pub mod handlers;
/// Route table.
pub mod routes;
/// Shared application state.
pub mod state;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use accounts::{Account, AccountDirectory, DirectoryError, MemoryAccountDirectory};
pub use error::ApiError;
pub use state::AppState;

/// Builds the application router with tracing and CORS applied.
#[must_use]
pub fn app(state: AppState) -> Router {
    routes::auth_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
