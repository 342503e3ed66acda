use super::*;

// =============================================================================
// bytes_to_hex / generate_token / hash_password
// =============================================================================

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_is_unique() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn hash_password_is_stable_sha256_hex() {
    assert_eq!(
        hash_password("secret"),
        "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
    );
}

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  A@B.com ").as_deref(), Some("a@b.com"));
}

#[test]
fn normalize_email_rejects_malformed() {
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("@b.com"), None);
    assert_eq!(normalize_email("a@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

// =============================================================================
// bearer_token
// =============================================================================

#[test]
fn bearer_token_extracts_value() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn bearer_token_rejects_other_schemes() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn bearer_token_missing_header() {
    assert_eq!(bearer_token(&HeaderMap::new()), None);
}

// =============================================================================
// DevState
// =============================================================================

#[test]
fn seed_user_normalizes_email() {
    let state = DevState::new();
    let profile = state.seed_user("A", "B", "A@B.com", "secret", Role::Student);
    assert_eq!(profile.email, "a@b.com");
    assert!(state.open_session("a@b.com").is_some());
}

#[test]
fn open_session_unknown_user_is_none() {
    let state = DevState::new();
    assert!(state.open_session("nobody@b.com").is_none());
    assert_eq!(state.session_count(), 0);
}

#[test]
fn open_session_records_token() {
    let state = DevState::new();
    state.seed_user("A", "B", "a@b.com", "secret", Role::Mentor);
    let auth = state.open_session("a@b.com").unwrap();
    assert_eq!(auth.role, Role::Mentor);
    assert_eq!(auth.user.first_name, "A");
    assert_eq!(state.session_count(), 1);
}

#[test]
fn pending_reset_token_absent_by_default() {
    let state = DevState::new();
    state.seed_user("A", "B", "a@b.com", "secret", Role::Student);
    assert_eq!(state.pending_reset_token("a@b.com"), None);
}

#[tokio::test]
async fn healthz_responds_ok() {
    let addr = spawn("127.0.0.1:0".parse().unwrap(), DevState::new())
        .await
        .unwrap();
    let body = reqwest::get(format!("http://{addr}/healthz"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn concurrent_registrations_for_one_email_admit_one() {
    let state = DevState::new();
    let addr = spawn("127.0.0.1:0".parse().unwrap(), state.clone())
        .await
        .unwrap();
    let url = format!("http://{addr}/api/auth/register");

    let mut handles = Vec::new();
    for i in 0..8 {
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let body = serde_json::json!({
                "firstName": format!("Racer{i}"),
                "lastName": "X",
                "email": "race@b.com",
                "password": "secret!",
                "role": "student"
            });
            reqwest::Client::new()
                .post(url)
                .json(&body)
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap() == reqwest::StatusCode::CREATED {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(state.session_count(), 1);
}
