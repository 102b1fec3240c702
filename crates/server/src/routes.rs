//! Route table.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// The authentication endpoints.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh-token", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
}
