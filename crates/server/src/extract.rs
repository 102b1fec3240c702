//! Request extractors.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};

use docuvault_authn::VerifiedIdentity;

use crate::{error::ApiError, state::AppState};

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Runs the full verification pipeline (decode, key lookup, signature
/// check) on every request it appears in; rejections become the uniform
/// 401 body.
pub struct AuthenticatedUser(pub VerifiedIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let identity = state.guard.authenticate(authorization).await?;
        Ok(Self(identity))
    }
}
