//! Local fake backend for the auth endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Serves `/auth/*` from in-memory tables so the CLI and the gateway tests can
//! run without the real API. Mounted under `/api` by `serve`/`spawn`, matching
//! the default client base URL.
//!
//! TRADE-OFFS
//! ==========
//! Everything is lost on restart and sessions never expire. Reset tokens are
//! logged instead of emailed.

#[cfg(test)]
#[path = "devserver_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::gateway::{AuthResponse, CurrentUser, SocialProvider};
use crate::profile::UserProfile;
use crate::session::Role;

const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone)]
struct DevUser {
    profile: UserProfile,
    password_hash: String,
    role: Role,
}

impl DevUser {
    fn new(first_name: &str, last_name: &str, email: &str, password: &str, role: Role) -> Self {
        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
        };
        Self { profile, password_hash: hash_password(password), role }
    }
}

#[derive(Debug, Default)]
struct DevTables {
    /// Users keyed by normalized email.
    users: HashMap<String, DevUser>,
    /// Session token -> email.
    sessions: HashMap<String, String>,
    /// Reset token -> email. Consumed on use.
    reset_tokens: HashMap<String, String>,
}

/// Shared dev-server state. Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct DevState {
    tables: Arc<Mutex<DevTables>>,
    latency: Duration,
}

impl DevState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Insert a user directly, bypassing registration checks.
    pub fn seed_user(&self, first_name: &str, last_name: &str, email: &str, password: &str, role: Role) -> UserProfile {
        let email = normalize_email(email).unwrap_or_else(|| email.to_owned());
        let user = DevUser::new(first_name, last_name, &email, password, role);
        let profile = user.profile.clone();
        self.lock().users.insert(email, user);
        profile
    }

    /// Outstanding reset token for `email`, if one was requested.
    #[must_use]
    pub fn pending_reset_token(&self, email: &str) -> Option<String> {
        let email = normalize_email(email)?;
        self.lock()
            .reset_tokens
            .iter()
            .find(|(_, owner)| **owner == email)
            .map(|(token, _)| token.clone())
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DevTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn open_session(&self, email: &str) -> Option<AuthResponse> {
        let mut tables = self.lock();
        let user = tables.users.get(email)?.clone();
        let token = generate_token();
        tables.sessions.insert(token.clone(), email.to_owned());
        Some(AuthResponse { token, role: user.role, user: user.profile })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

/// `POST /auth/login`
async fn login(State(state): State<DevState>, Json(body): Json<LoginBody>) -> Response {
    state.simulate_latency().await;
    let Some(email) = normalize_email(&body.email) else {
        return reject(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    let matches = state
        .lock()
        .users
        .get(&email)
        .is_some_and(|u| u.password_hash == hash_password(&body.password));
    if !matches {
        tracing::info!(%email, "dev login rejected");
        return reject(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    match state.open_session(&email) {
        Some(auth) => Json(auth).into_response(),
        None => reject(StatusCode::INTERNAL_SERVER_ERROR, "Server Error"),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    role: String,
}

/// `POST /auth/register`
async fn register(State(state): State<DevState>, Json(body): Json<RegisterBody>) -> Response {
    state.simulate_latency().await;
    let Some(email) = normalize_email(&body.email) else {
        return reject(StatusCode::BAD_REQUEST, "Invalid email");
    };
    let Ok(role) = body.role.parse::<Role>() else {
        return reject(StatusCode::BAD_REQUEST, "Invalid role");
    };
    if body.password.len() < MIN_PASSWORD_LEN {
        return reject(StatusCode::BAD_REQUEST, "Password must be at least 6 characters");
    }
    match state.lock().users.entry(email.clone()) {
        Entry::Occupied(_) => return reject(StatusCode::BAD_REQUEST, "User already exists"),
        Entry::Vacant(slot) => {
            slot.insert(DevUser::new(body.first_name.trim(), body.last_name.trim(), &email, &body.password, role));
        }
    }
    tracing::info!(%email, %role, "dev user registered");
    match state.open_session(&email) {
        Some(auth) => (StatusCode::CREATED, Json(auth)).into_response(),
        None => reject(StatusCode::INTERNAL_SERVER_ERROR, "Server Error"),
    }
}

#[derive(Deserialize)]
struct ForgotPasswordBody {
    email: String,
}

/// `POST /auth/forgot-password`
async fn forgot_password(State(state): State<DevState>, Json(body): Json<ForgotPasswordBody>) -> Response {
    state.simulate_latency().await;
    let Some(email) = normalize_email(&body.email) else {
        return reject(StatusCode::BAD_REQUEST, "Invalid email");
    };
    let mut tables = state.lock();
    if !tables.users.contains_key(&email) {
        return reject(StatusCode::NOT_FOUND, "User not found");
    }
    tables.reset_tokens.retain(|_, owner| *owner != email);
    let token = generate_token();
    tables.reset_tokens.insert(token.clone(), email.clone());
    tracing::info!(%email, reset_token = %token, "dev reset token issued");
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody {
    token: String,
    new_password: String,
}

/// `POST /auth/reset-password`
async fn reset_password(State(state): State<DevState>, Json(body): Json<ResetPasswordBody>) -> Response {
    state.simulate_latency().await;
    if body.new_password.len() < MIN_PASSWORD_LEN {
        return reject(StatusCode::BAD_REQUEST, "Password must be at least 6 characters");
    }
    let mut tables = state.lock();
    let Some(email) = tables.reset_tokens.remove(&body.token) else {
        return reject(StatusCode::BAD_REQUEST, "Invalid or expired reset token");
    };
    let Some(user) = tables.users.get_mut(&email) else {
        return reject(StatusCode::BAD_REQUEST, "Invalid or expired reset token");
    };
    user.password_hash = hash_password(&body.new_password);
    tracing::info!(%email, "dev password reset");
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SocialBody {
    token: String,
}

/// `POST /auth/social/{provider}`
async fn social_login(
    State(state): State<DevState>,
    Path(provider): Path<String>,
    Json(body): Json<SocialBody>,
) -> Response {
    state.simulate_latency().await;
    let Ok(provider) = provider.parse::<SocialProvider>() else {
        return reject(StatusCode::BAD_REQUEST, "Unsupported provider");
    };
    let provider_token = body.token.trim();
    if provider_token.is_empty() {
        return reject(StatusCode::BAD_REQUEST, "Invalid social token");
    }

    let fingerprint = hash_password(provider_token);
    let email = format!("{provider}-{}@social.local", &fingerprint[..12]);
    let known = state.lock().users.contains_key(&email);
    if !known {
        let first_name = match provider {
            SocialProvider::Google => "Google",
            SocialProvider::LinkedIn => "LinkedIn",
        };
        state.seed_user(first_name, "User", &email, &generate_token(), Role::Student);
        tracing::info!(%email, %provider, "dev social user created");
    }
    match state.open_session(&email) {
        Some(auth) => Json(auth).into_response(),
        None => reject(StatusCode::INTERNAL_SERVER_ERROR, "Server Error"),
    }
}

/// `GET /auth/me`
async fn me(State(state): State<DevState>, headers: HeaderMap) -> Response {
    state.simulate_latency().await;
    let Some(token) = bearer_token(&headers) else {
        return reject(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    let tables = state.lock();
    let user = tables
        .sessions
        .get(token)
        .and_then(|email| tables.users.get(email));
    match user {
        Some(user) => Json(CurrentUser { role: user.role, user: user.profile.clone() }).into_response(),
        None => reject(StatusCode::UNAUTHORIZED, "Not authorized"),
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Auth routes without a prefix.
pub fn auth_routes(state: DevState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/social/{provider}", post(social_login))
        .route("/auth/me", get(me))
        .with_state(state)
}

/// Full dev app: auth routes under `/api` plus `/healthz`.
pub fn app(state: DevState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", auth_routes(state))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Bind `addr` and serve on a background task, returning the bound address.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn spawn(addr: SocketAddr, state: DevState) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            tracing::error!(error = %e, "dev server stopped");
        }
    });
    tracing::debug!(%bound, "dev server spawned");
    Ok(bound)
}

/// Bind `addr` and serve until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: DevState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "careerprep dev server listening");
    axum::serve(listener, app(state)).await
}
