//! Authentication API endpoints.
//!
//! These proxy the identity provider and manage bearer-token sessions. When
//! no provider is configured the endpoints report that instead of guessing.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::auth::{self, SessionUser};
use crate::errors::AppError;
use crate::AppState;

/// Email/password credentials for sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a password reset email.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// An opened session: bearer token plus the signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

/// POST /api/auth/signup - Register a new account and open a session.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<SessionResponse> {
    let Some(identity) = state.identity.as_ref() else {
        return error(auth_not_configured(), 0);
    };

    match identity.sign_up(&request.email, &request.password).await {
        Ok(user) => success(open_session(&state, user), 0),
        Err(e) => error(AppError::Auth(e), 0),
    }
}

/// POST /api/auth/login - Sign in and open a session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<SessionResponse> {
    let Some(identity) = state.identity.as_ref() else {
        return error(auth_not_configured(), 0);
    };

    match identity.sign_in(&request.email, &request.password).await {
        Ok(user) => success(open_session(&state, user), 0),
        Err(e) => error(AppError::Auth(e), 0),
    }
}

/// POST /api/auth/reset - Ask the provider to send a password reset email.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<()> {
    let Some(identity) = state.identity.as_ref() else {
        return error(auth_not_configured(), 0);
    };

    match identity.send_password_reset(&request.email).await {
        Ok(()) => success((), 0),
        Err(e) => error(AppError::Auth(e), 0),
    }
}

/// POST /api/auth/logout - Discard the current session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(token) = auth::bearer_token(&headers) {
        state.sessions.remove(&token);
    }
    success((), 0)
}

/// GET /api/auth/me - The user behind the current session token.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionUser> {
    match auth::bearer_token(&headers).and_then(|token| state.sessions.current_user(&token)) {
        Some(user) => success(user, 0),
        None => error(
            AppError::Unauthorized("No active session".to_string()),
            0,
        ),
    }
}

fn open_session(state: &AppState, user: crate::auth::ProviderUser) -> SessionResponse {
    let session_user = SessionUser {
        id: user.id,
        email: user.email,
    };
    let token = state.sessions.create(session_user.clone());
    SessionResponse {
        token,
        user: session_user,
    }
}

fn auth_not_configured() -> AppError {
    AppError::BadRequest("Authentication is not configured on this server".to_string())
}
