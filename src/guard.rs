//! Route guards deciding whether a page subtree renders or redirects.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guards are pure functions of the credential store at the moment they are
//! asked. They never call the server and never subscribe to changes; a stale
//! token is only discovered by whichever API call the page makes next.
//!
//! DESIGN
//! ======
//! `RequireAuth` is the single authorization predicate. `RequireRole` refines
//! it: authenticated and holding an allowed role.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use crate::session::{CredentialStore, Role};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Outcome of a guard check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Render,
    Redirect(&'static str),
}

/// Guarded content: the rendered children, or where to go instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Render(T),
    Redirect(&'static str),
}

impl<T> Guarded<T> {
    #[must_use]
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Render(_) => None,
            Self::Redirect(path) => Some(*path),
        }
    }
}

pub trait RouteGuard {
    fn check(&self, credentials: &CredentialStore) -> Access;

    /// Produce `children` only when access is granted.
    fn guard<T, F>(&self, credentials: &CredentialStore, children: F) -> Guarded<T>
    where
        F: FnOnce() -> T,
        Self: Sized,
    {
        match self.check(credentials) {
            Access::Render => Guarded::Render(children()),
            Access::Redirect(path) => Guarded::Redirect(path),
        }
    }
}

/// Renders iff a token is held; otherwise redirects to `/login`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequireAuth;

impl RouteGuard for RequireAuth {
    fn check(&self, credentials: &CredentialStore) -> Access {
        if credentials.is_authenticated() {
            Access::Render
        } else {
            tracing::debug!(to = LOGIN_PATH, "unauthenticated; redirecting");
            Access::Redirect(LOGIN_PATH)
        }
    }
}

/// Renders iff authenticated with a role in `allowed`; otherwise redirects
/// to `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequireRole {
    allowed: Vec<Role>,
}

impl RequireRole {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self { allowed: allowed.into_iter().collect() }
    }

    #[must_use]
    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }
}

impl RouteGuard for RequireRole {
    fn check(&self, credentials: &CredentialStore) -> Access {
        let permitted = RequireAuth.check(credentials) == Access::Render
            && credentials
                .role()
                .is_some_and(|role| self.allowed.contains(&role));
        if permitted {
            Access::Render
        } else {
            tracing::debug!(role = ?credentials.role(), to = HOME_PATH, "role not allowed; redirecting");
            Access::Redirect(HOME_PATH)
        }
    }
}
