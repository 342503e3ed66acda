//! Page routing table for the app shell.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public pages (home, login, registration, password reset) always render.
//! Everything under `/dashboard` sits behind `RequireAuth`; the mentor
//! directory and webinars additionally sit behind a student/mentor
//! `RequireRole`. Unknown paths go home.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use crate::guard::{Access, HOME_PATH, RequireAuth, RequireRole, RouteGuard};
use crate::session::{CredentialStore, Role};

/// Every page the app can render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Meeting,
    Resume,
    Interview,
    Roadmap,
    Networking,
    CommunityGroup { community_id: String },
    EventRegistration { event_id: String },
    Settings,
    Mentors,
    Webinars,
}

impl Page {
    /// Match a location path (query string and trailing slash ignored).
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let page = match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["forgot-password"] => Self::ForgotPassword,
            ["reset-password"] => Self::ResetPassword,
            ["dashboard"] => Self::Dashboard,
            ["dashboard", "meeting"] => Self::Meeting,
            ["dashboard", "resume"] => Self::Resume,
            ["dashboard", "interview"] => Self::Interview,
            ["dashboard", "roadmap"] => Self::Roadmap,
            ["dashboard", "networking"] => Self::Networking,
            ["dashboard", "networking", "community", id] => Self::CommunityGroup { community_id: (*id).to_owned() },
            ["dashboard", "networking", "event", id] => Self::EventRegistration { event_id: (*id).to_owned() },
            ["dashboard", "settings"] => Self::Settings,
            ["dashboard", "mentors"] => Self::Mentors,
            ["dashboard", "webinars"] => Self::Webinars,
            _ => return None,
        };
        Some(page)
    }

    /// Canonical path for this page.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::ForgotPassword => "/forgot-password".to_owned(),
            Self::ResetPassword => "/reset-password".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Meeting => "/dashboard/meeting".to_owned(),
            Self::Resume => "/dashboard/resume".to_owned(),
            Self::Interview => "/dashboard/interview".to_owned(),
            Self::Roadmap => "/dashboard/roadmap".to_owned(),
            Self::Networking => "/dashboard/networking".to_owned(),
            Self::CommunityGroup { community_id } => format!("/dashboard/networking/community/{community_id}"),
            Self::EventRegistration { event_id } => format!("/dashboard/networking/event/{event_id}"),
            Self::Settings => "/dashboard/settings".to_owned(),
            Self::Mentors => "/dashboard/mentors".to_owned(),
            Self::Webinars => "/dashboard/webinars".to_owned(),
        }
    }

    /// Whether the page is reachable without signing in.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Home | Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword)
    }

    /// Roles allowed on role-gated pages; `None` when only sign-in is needed.
    #[must_use]
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Self::Mentors | Self::Webinars => Some(&[Role::Student, Role::Mentor]),
            _ => None,
        }
    }
}

/// Where a navigation ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Redirect(&'static str),
}

/// Resolve `path` and run it through the guards that wrap it.
#[must_use]
pub fn navigate(path: &str, credentials: &CredentialStore) -> Navigation {
    let Some(page) = Page::resolve(path) else {
        tracing::debug!(%path, "unknown path; redirecting home");
        return Navigation::Redirect(HOME_PATH);
    };
    if page.is_public() {
        return Navigation::Render(page);
    }

    // Dashboard layout guard first, then any role guard on the child page.
    if let Access::Redirect(to) = RequireAuth.check(credentials) {
        return Navigation::Redirect(to);
    }
    if let Some(allowed) = page.allowed_roles() {
        if let Access::Redirect(to) = RequireRole::new(allowed.iter().copied()).check(credentials) {
            return Navigation::Redirect(to);
        }
    }
    Navigation::Render(page)
}

/// Role the dashboard layout renders for; students when unknown.
#[must_use]
pub fn layout_role(credentials: &CredentialStore) -> Role {
    credentials.role().unwrap_or(Role::Student)
}
