//! Session authentication module.
//!
//! Sign-up, sign-in and password reset are delegated to the identity
//! provider; this module keeps the bearer-token session store and the
//! request guard. Token comparison is constant-time to mitigate timing
//! attacks.

mod provider;

pub use provider::*;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// The signed-in user attached to a session token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

/// In-memory bearer-token session store.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionUser>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a signed-in user; returns the bearer token.
    pub fn create(&self, user: SessionUser) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(token.clone(), user);
        token
    }

    /// Discard a session. Signing out an unknown token is not an error.
    pub fn remove(&self, token: &str) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(token);
    }

    /// Look up the user behind a token, comparing tokens in constant time.
    pub fn current_user(&self, token: &str) -> Option<SessionUser> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .iter()
            .find(|(stored, _)| constant_time_compare(stored, token))
            .map(|(_, user)| user.clone())
    }
}

/// Session authentication layer guarding the API routes.
///
/// When no identity provider is configured the guard is a no-op (dev mode).
pub async fn session_auth_layer(
    sessions: Arc<SessionStore>,
    auth_enabled: bool,
    request: Request,
    next: Next,
) -> Response {
    if !auth_enabled {
        return next.run(request).await;
    }

    let token = bearer_token(request.headers());

    match token {
        Some(token) if sessions.current_user(&token).is_some() => next.run(request).await,
        Some(_) => unauthorized_response("Invalid or expired session"),
        None => unauthorized_response("Missing session token"),
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
