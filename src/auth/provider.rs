//! Identity provider client.
//!
//! Talks to a Google-Identity-style REST endpoint (email/password accounts,
//! query-string API key). Provider error codes are opaque strings; they are
//! classified into [`AuthError`] here, once, so nothing downstream ever
//! inspects a raw code.

use axum::http::StatusCode;
use serde::Deserialize;

/// Classified authentication failure. One human-readable message per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    EmailAlreadyInUse,
    WeakPassword,
    /// Transport failure or an unrecognized provider code
    Provider(String),
}

impl AuthError {
    /// Classify a provider error-code string.
    pub fn from_provider_code(code: &str) -> Self {
        // WEAK_PASSWORD arrives with a suffix: "WEAK_PASSWORD : Password
        // should be at least 6 characters"
        if code.starts_with("WEAK_PASSWORD") {
            return AuthError::WeakPassword;
        }
        match code {
            "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
            other => AuthError::Provider(format!("Authentication failed ({})", other)),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::InvalidEmail | AuthError::EmailAlreadyInUse | AuthError::WeakPassword => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AuthError::UserNotFound => "No account found with this email",
            AuthError::WrongPassword => "Incorrect email or password",
            AuthError::InvalidEmail => "Invalid email address",
            AuthError::EmailAlreadyInUse => "This email is already in use",
            AuthError::WeakPassword => "Password is too weak",
            AuthError::Provider(msg) => msg,
        };
        write!(f, "{}", message)
    }
}

impl std::error::Error for AuthError {}

/// An authenticated user as reported by the provider.
#[derive(Debug, Clone)]
pub struct ProviderUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetails {
    message: String,
}

/// HTTP client for the identity provider.
pub struct IdentityProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl IdentityProvider {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    /// Register a new email/password account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError> {
        self.account_call(
            "accounts:signUp",
            serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    /// Exchange email/password for the account identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError> {
        self.account_call(
            "accounts:signInWithPassword",
            serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    /// Ask the provider to email a password-reset link.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let url = format!("{}/accounts:sendOobCode?key={}", self.api_base, self.api_key);
        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email,
        });

        let response = self.http.post(&url).json(&body).send().await.map_err(|err| {
            tracing::warn!("Identity provider transport failure: {:?}", err);
            AuthError::Provider("Authentication service unavailable".to_string())
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::classify_failure(response).await)
        }
    }

    async fn account_call(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<ProviderUser, AuthError> {
        let url = format!("{}/{}?key={}", self.api_base, endpoint, self.api_key);

        let response = self.http.post(&url).json(&body).send().await.map_err(|err| {
            tracing::warn!("Identity provider transport failure: {:?}", err);
            AuthError::Provider("Authentication service unavailable".to_string())
        })?;

        if response.status().is_success() {
            let account: AccountResponse = response.json().await.map_err(|err| {
                tracing::warn!("Malformed identity provider response: {:?}", err);
                AuthError::Provider("Authentication service unavailable".to_string())
            })?;
            Ok(ProviderUser {
                id: account.local_id,
                email: account.email,
            })
        } else {
            Err(Self::classify_failure(response).await)
        }
    }

    /// Extract and classify the provider error code from a failed response.
    async fn classify_failure(response: reqwest::Response) -> AuthError {
        let status = response.status();
        match response.json::<ProviderErrorBody>().await {
            Ok(body) => AuthError::from_provider_code(&body.error.message),
            Err(_) => {
                tracing::warn!("Identity provider failure without error body: {}", status);
                AuthError::Provider("Authentication failed".to_string())
            }
        }
    }
}
