//! HTTP handlers for the authentication endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use docuvault_authn::TokenPair;
use docuvault_session_store::{SessionId, UserId};

use crate::{
    error::{ApiError, refresh_error},
    extract::AuthenticatedUser,
    state::AppState,
};

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    /// Login email; must be unique.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Body of `POST /auth/refresh-token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefreshRequest {
    /// The refresh token being exchanged.
    pub refresh_token: String,
}

/// Body of `POST /auth/logout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogoutRequest {
    /// The account whose session is being closed.
    pub user_id: UserId,
    /// The session identifier (carried as the `sid` claim in the
    /// session's tokens).
    pub jti: String,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// The account identifier.
    pub id: UserId,
    /// The account's login email.
    pub email: String,
}

/// Response to register and login: the account plus its first token pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The account the session belongs to.
    pub user: UserInfo,
    /// Access token for requests, refresh token for rotation.
    pub tokens: TokenPair,
}

/// Response to a successful refresh: just the rotated pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// The rotated token pair.
    pub tokens: TokenPair,
}

/// Response to `GET /auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// The authenticated account identifier.
    pub user_id: UserId,
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// `POST /auth/register` — creates an account and logs it straight in.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_non_empty(&request.email, "email")?;
    require_non_empty(&request.password, "password")?;

    let account = state.accounts.register(&request.email, &request.password).await?;
    let session = state.issuer.issue(account.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo { id: account.id, email: account.email },
            tokens: session.tokens,
        }),
    ))
}

/// `POST /auth/login` — verifies credentials and opens a new session.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let account =
        state.accounts.verify_credentials(&request.email, &request.password).await?;
    let session = state.issuer.issue(account.id).await?;

    Ok(Json(AuthResponse {
        user: UserInfo { id: account.id, email: account.email },
        tokens: session.tokens,
    }))
}

/// `POST /auth/refresh-token` — exchanges a refresh token for a rotated
/// pair. Any verification failure is terminal for the presented token.
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let session =
        state.issuer.refresh(&request.refresh_token).await.map_err(refresh_error)?;

    Ok(Json(RefreshResponse { tokens: session.tokens }))
}

/// `POST /auth/logout` revokes the session named in the body.
///
/// Idempotent: a session that is already gone (earlier logout, idle
/// expiry) still gets a 200. No bearer token is required; deleting a key
/// record can only force a re-login, and the caller may be logging out
/// precisely because its tokens no longer verify.
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    state.issuer.logout(request.user_id, &SessionId::from(request.jti)).await?;
    Ok(StatusCode::OK)
}

/// `GET /auth/me` — who the presented access token belongs to.
#[tracing::instrument(skip_all)]
pub async fn me(AuthenticatedUser(identity): AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse { user_id: identity.user_id() })
}
