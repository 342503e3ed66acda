use super::*;

use std::sync::Arc;

use crate::session::Session;
use crate::storage::MemoryStorage;

fn anonymous() -> CredentialStore {
    CredentialStore::load(Arc::new(MemoryStorage::new()))
}

fn signed_in(role: Role) -> CredentialStore {
    let store = anonymous();
    store.establish(Session { token: "tok".to_owned(), role });
    store
}

// =============================================================================
// Page::resolve / path
// =============================================================================

#[test]
fn resolve_public_pages() {
    assert_eq!(Page::resolve("/"), Some(Page::Home));
    assert_eq!(Page::resolve(""), Some(Page::Home));
    assert_eq!(Page::resolve("/login"), Some(Page::Login));
    assert_eq!(Page::resolve("/register"), Some(Page::Register));
    assert_eq!(Page::resolve("/forgot-password"), Some(Page::ForgotPassword));
    assert_eq!(Page::resolve("/reset-password?token=abc"), Some(Page::ResetPassword));
}

#[test]
fn resolve_dashboard_children() {
    assert_eq!(Page::resolve("/dashboard/"), Some(Page::Dashboard));
    assert_eq!(Page::resolve("/dashboard/resume"), Some(Page::Resume));
    assert_eq!(Page::resolve("/dashboard/mentors#top"), Some(Page::Mentors));
    assert_eq!(
        Page::resolve("/dashboard/networking/community/rust-club"),
        Some(Page::CommunityGroup { community_id: "rust-club".to_owned() })
    );
    assert_eq!(
        Page::resolve("/dashboard/networking/event/42"),
        Some(Page::EventRegistration { event_id: "42".to_owned() })
    );
}

#[test]
fn resolve_unknown_paths() {
    assert_eq!(Page::resolve("/admin"), None);
    assert_eq!(Page::resolve("/dashboard/unknown"), None);
    assert_eq!(Page::resolve("/dashboard/networking/community"), None);
}

#[test]
fn path_resolves_back_to_same_page() {
    let pages = [
        Page::Home,
        Page::Settings,
        Page::Webinars,
        Page::CommunityGroup { community_id: "c1".to_owned() },
        Page::EventRegistration { event_id: "e1".to_owned() },
    ];
    for page in pages {
        assert_eq!(Page::resolve(&page.path()), Some(page.clone()), "{page:?}");
    }
}

// =============================================================================
// navigate
// =============================================================================

#[test]
fn public_pages_render_for_anyone() {
    assert_eq!(navigate("/login", &anonymous()), Navigation::Render(Page::Login));
    assert_eq!(navigate("/", &signed_in(Role::Mentor)), Navigation::Render(Page::Home));
}

#[test]
fn dashboard_requires_sign_in() {
    assert_eq!(navigate("/dashboard", &anonymous()), Navigation::Redirect("/login"));
    assert_eq!(navigate("/dashboard/settings", &anonymous()), Navigation::Redirect("/login"));
    assert_eq!(navigate("/dashboard", &signed_in(Role::Student)), Navigation::Render(Page::Dashboard));
}

#[test]
fn mentors_page_goes_to_login_before_role_check() {
    assert_eq!(navigate("/dashboard/mentors", &anonymous()), Navigation::Redirect("/login"));
}

#[test]
fn mentors_and_webinars_render_for_both_roles() {
    for role in [Role::Student, Role::Mentor] {
        let store = signed_in(role);
        assert_eq!(navigate("/dashboard/mentors", &store), Navigation::Render(Page::Mentors));
        assert_eq!(navigate("/dashboard/webinars", &store), Navigation::Render(Page::Webinars));
    }
}

#[test]
fn unknown_paths_redirect_home() {
    assert_eq!(navigate("/nowhere", &signed_in(Role::Student)), Navigation::Redirect("/"));
    assert_eq!(navigate("/nowhere", &anonymous()), Navigation::Redirect("/"));
}

#[test]
fn layout_role_defaults_to_student() {
    assert_eq!(layout_role(&anonymous()), Role::Student);
    assert_eq!(layout_role(&signed_in(Role::Mentor)), Role::Mentor);
}
