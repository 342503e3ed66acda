//! Session-scoped profile of the signed-in user.
//!
//! Held in memory only. Filled from auth responses (or `/auth/me` on startup)
//! and read by display code such as greetings and settings form defaults.

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Display fields for the current user as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserProfile {
    /// "First Last", skipping whichever part is blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Shared handle to the last-known profile.
#[derive(Clone, Debug, Default)]
pub struct ProfileCache {
    inner: Arc<RwLock<Option<UserProfile>>>,
}

impl ProfileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<UserProfile> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, profile: UserProfile) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(profile);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.get().map(|p| p.display_name()).filter(|name| !name.is_empty())
    }

    /// Dashboard greeting line.
    #[must_use]
    pub fn greeting(&self) -> String {
        let first = self
            .get()
            .map(|p| p.first_name.trim().to_owned())
            .filter(|name| !name.is_empty());
        match first {
            Some(name) => format!("Welcome back, {name}!"),
            None => "Welcome back!".to_owned(),
        }
    }
}
