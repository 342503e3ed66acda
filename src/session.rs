//! Credential store for the active session token and role.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards read this store on every navigation; the auth gateway is the
//! only writer on the success path and `logout` the only writer on the clear
//! path. Handles are cloned into whoever needs them instead of living in a
//! process-wide static, so tests can run isolated sessions side by side.
//!
//! INVARIANT
//! =========
//! A role is held if and only if a non-empty token is held. Storage that
//! contains only one of the two keys, a blank token, or an unrecognised role
//! loads as unauthenticated.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::storage::{DurableStorage, ROLE_KEY, TOKEN_KEY};

// =============================================================================
// ROLE
// =============================================================================

/// Account role declared by the server at login or registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "mentor" => Ok(Self::Mentor),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// An authenticated session: opaque bearer token plus role tag.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

/// Shared handle to the current session and its durable backing.
#[derive(Clone)]
pub struct CredentialStore {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn DurableStorage>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Build a store from whatever `storage` currently holds.
    pub fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let current = read_session(storage.as_ref());
        match &current {
            Some(session) => tracing::debug!(role = %session.role, "restored stored session"),
            None => tracing::debug!("no stored session; starting unauthenticated"),
        }
        Self { current: Arc::new(RwLock::new(current)), storage }
    }

    /// True iff a token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(|s| s.role)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    /// Drop the in-memory session and both storage keys. No network call.
    pub fn logout(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        for key in [TOKEN_KEY, ROLE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(error = %e, key, "failed to remove stored credential");
            }
        }
        tracing::info!("session cleared");
    }

    /// Replace the current session, persisting token then role.
    pub(crate) fn establish(&self, session: Session) {
        if let Err(e) = self.storage.set(TOKEN_KEY, &session.token) {
            tracing::warn!(error = %e, "failed to persist session token");
        }
        if let Err(e) = self.storage.set(ROLE_KEY, session.role.as_str()) {
            tracing::warn!(error = %e, "failed to persist session role");
        }
        tracing::info!(role = %session.role, "session established");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_session(storage: &dyn DurableStorage) -> Option<Session> {
    let token = match storage.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.trim().is_empty())?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored token");
            return None;
        }
    };
    let raw_role = match storage.get(ROLE_KEY) {
        Ok(role) => role?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored role");
            return None;
        }
    };
    match raw_role.parse::<Role>() {
        Ok(role) => Some(Session { token, role }),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring stored session with unrecognised role");
            None
        }
    }
}
