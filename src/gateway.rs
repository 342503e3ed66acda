//! Auth gateway: one outbound request per identity operation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Login, registration and social login write the credential store and the
//! profile cache before returning. Forgot/reset password only talk to the
//! server. Nothing here retries, queues, or cancels.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes an `AuthError` carrying a display-ready message: the
//! server's `message` field when it sent one, otherwise a fixed per-operation
//! fallback. Forms show the message inline; nothing is fatal.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::profile::{ProfileCache, UserProfile};
use crate::session::{CredentialStore, Role, Session};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const FORGOT_PASSWORD_FAILED: &str = "Failed to send reset link";
pub const RESET_PASSWORD_FAILED: &str = "Failed to reset password";
pub const SOCIAL_LOGIN_FAILED: &str = "Social login failed";
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile";

// =============================================================================
// ERROR
// =============================================================================

/// The single failure kind raised by gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Non-empty string `message` field of a JSON error body, if any.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Social identity providers accepted by `/auth/social/{provider}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    LinkedIn,
}

impl SocialProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::LinkedIn => "linkedin",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported social provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for SocialProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "linkedin" => Ok(Self::LinkedIn),
            other => Err(UnknownProvider(other.to_owned())),
        }
    }
}

/// Successful login/register/social-login payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub user: UserProfile,
}

/// Fields submitted by the registration form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct SocialLoginRequest<'a> {
    token: &'a str,
}

/// `GET /auth/me` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub role: Role,
    pub user: UserProfile,
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct AuthGateway {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: CredentialStore,
    profile: ProfileCache,
}

impl AuthGateway {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, credentials: CredentialStore, profile: ProfileCache) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| AuthError::new(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, config, credentials, profile })
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileCache {
        &self.profile
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Fails with the server's message or "Login failed".
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        self.authenticate("auth/login", &LoginRequest { email, password }, LOGIN_FAILED)
            .await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Fails with the server's message or "Registration failed".
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, AuthError> {
        self.authenticate("auth/register", registration, REGISTRATION_FAILED)
            .await
    }

    /// `POST /auth/forgot-password`. Resolves once the server accepts it.
    ///
    /// # Errors
    ///
    /// Fails with the server's message or "Failed to send reset link".
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.post("auth/forgot-password", &ForgotPasswordRequest { email }, FORGOT_PASSWORD_FAILED)
            .await
            .map(drop)
    }

    /// `POST /auth/reset-password`.
    ///
    /// # Errors
    ///
    /// Fails with the server's message or "Failed to reset password".
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let body = ResetPasswordRequest { token, new_password };
        self.post("auth/reset-password", &body, RESET_PASSWORD_FAILED)
            .await
            .map(drop)
    }

    /// `POST /auth/social/{provider}` with the provider-issued token.
    ///
    /// # Errors
    ///
    /// Fails with the server's message or "Social login failed".
    pub async fn social_login(&self, provider: SocialProvider, provider_token: &str) -> Result<AuthResponse, AuthError> {
        let path = format!("auth/social/{}", provider.as_str());
        self.authenticate(&path, &SocialLoginRequest { token: provider_token }, SOCIAL_LOGIN_FAILED)
            .await
    }

    /// Forget the session locally. The server is not told.
    pub fn logout(&self) {
        self.credentials.logout();
        self.profile.clear();
    }

    /// Fill the profile cache from `GET /auth/me` using the stored token.
    ///
    /// Used after a restart, when only token and role survived. A rejected
    /// token is reported but the stored session is left alone.
    ///
    /// # Errors
    ///
    /// Fails when no token is held, or with the server's message or
    /// "Failed to load profile".
    pub async fn restore_profile(&self) -> Result<UserProfile, AuthError> {
        let Some(token) = self.credentials.token() else {
            return Err(AuthError::new(PROFILE_LOAD_FAILED));
        };
        let url = self.config.endpoint("auth/me");
        tracing::debug!(%url, "fetching current profile");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_failure(&url, &e, PROFILE_LOAD_FAILED))?;
        let text = read_success_body(&url, response, PROFILE_LOAD_FAILED).await?;
        let current: CurrentUser = decode(&url, &text, PROFILE_LOAD_FAILED)?;

        self.profile.set(current.user.clone());
        Ok(current.user)
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        let url = self.config.endpoint(path);
        let text = self.post(path, body, fallback).await?;
        let auth: AuthResponse = decode(&url, &text, fallback)?;
        if auth.token.trim().is_empty() {
            tracing::warn!(%url, "auth response carried an empty token");
            return Err(AuthError::new(fallback));
        }

        self.credentials
            .establish(Session { token: auth.token.clone(), role: auth.role });
        self.profile.set(auth.user.clone());
        Ok(auth)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B, fallback: &str) -> Result<String, AuthError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "auth request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failure(&url, &e, fallback))?;
        read_success_body(&url, response, fallback).await
    }
}

fn transport_failure(url: &str, error: &reqwest::Error, fallback: &str) -> AuthError {
    tracing::warn!(%url, error = %error, "auth request failed");
    AuthError::new(fallback)
}

async fn read_success_body(url: &str, response: reqwest::Response, fallback: &str) -> Result<String, AuthError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_failure(url, &e, fallback))?;

    if !status.is_success() {
        let message = server_message(&text).unwrap_or_else(|| fallback.to_owned());
        tracing::warn!(%url, status = status.as_u16(), %message, "auth request rejected");
        return Err(AuthError::new(message));
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(url: &str, text: &str, fallback: &str) -> Result<T, AuthError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(%url, error = %e, "auth response did not decode");
        AuthError::new(fallback)
    })
}
