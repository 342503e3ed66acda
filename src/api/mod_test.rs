use super::*;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::session::{Role, Session};
use crate::storage::MemoryStorage;

// =============================================================================
// FAKE API
// =============================================================================

fn auth_header(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn question(id: &str, title: &str, description: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": description,
        "category": "technical",
        "difficulty": "easy",
        "type": "mcq",
        "correctAnswer": "a"
    })
}

fn interview(id: &str, status: &str, feedback: Option<Value>) -> Value {
    json!({
        "_id": id,
        "userId": "u1",
        "subject": "Graphs",
        "type": "mock",
        "status": status,
        "scheduledDate": "2024-06-01T09:00:00.000Z",
        "duration": 30,
        "feedback": feedback
    })
}

async fn list_questions(headers: HeaderMap, Query(query): Query<BTreeMap<String, String>>) -> Json<Value> {
    let echoed = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    Json(json!([question("q1", &auth_header(&headers), &echoed)]))
}

async fn get_question(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Question not found" }))).into_response();
    }
    Json(question(&id, "found", "")).into_response()
}

async fn create_question(Json(mut body): Json<Value>) -> Response {
    body["_id"] = json!("q-new");
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_question(Path(id): Path<String>, Json(mut body): Json<Value>) -> Json<Value> {
    body["_id"] = json!(id);
    Json(body)
}

async fn delete_question() -> Json<Value> {
    Json(json!({ "message": "Question deleted successfully" }))
}

async fn search_resources(Query(query): Query<BTreeMap<String, String>>) -> Json<Value> {
    let q = query.get("q").cloned().unwrap_or_default();
    Json(json!([{ "_id": "r1", "title": q, "subject": "algorithms", "type": "article" }]))
}

async fn interview_feedback(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(interview(&id, "completed", body.get("feedback").cloned()))
}

async fn create_interview(Json(body): Json<Value>) -> Response {
    let mut doc = interview("i-new", "scheduled", None);
    doc["subject"] = body["subject"].clone();
    doc["duration"] = body["duration"].clone();
    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn cancel_interview() -> Json<Value> {
    Json(json!({ "message": "Interview cancelled successfully" }))
}

async fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Not authorized" }))).into_response()
}

async fn crash() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn not_a_list() -> Json<Value> {
    Json(json!({ "not": "a list" }))
}

fn fake_api() -> Router {
    let api = Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", get(get_question).put(update_question).delete(delete_question))
        .route("/resources", get(not_a_list))
        .route("/resources/search", get(search_resources))
        .route("/interviews", get(unauthorized).post(create_interview))
        .route("/interviews/{id}", axum::routing::delete(cancel_interview))
        .route("/interviews/{id}/feedback", post(interview_feedback))
        .route("/users", get(crash));
    Router::new().nest("/api", api)
}

async fn serve_fake() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fake_api()).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr, token: Option<&str>) -> ApiClient {
    let credentials = CredentialStore::load(Arc::new(MemoryStorage::new()));
    if let Some(token) = token {
        credentials.establish(Session { token: token.to_owned(), role: Role::Student });
    }
    let config = ClientConfig::new(&format!("http://{addr}/api")).unwrap();
    ApiClient::new(config, credentials).unwrap()
}

// =============================================================================
// Bearer header / unauthenticated
// =============================================================================

#[tokio::test]
async fn requests_carry_bearer_token() {
    let client = client_for(serve_fake().await, Some("tok-1"));
    let questions = client.questions().list().await.unwrap();
    assert_eq!(questions[0].title, "Bearer tok-1");
}

#[tokio::test]
async fn no_token_fails_without_sending() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(addr, None);

    let err = client.questions().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn server_401_is_reported_not_acted_on() {
    let client = client_for(serve_fake().await, Some("stale"));
    let err = client.interviews().list().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Not authorized (status 401)");
    assert!(client.credentials.is_authenticated());
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn list_filtered_sends_query_string() {
    let client = client_for(serve_fake().await, Some("tok"));
    let filter = QuestionFilter {
        category: Some(QuestionCategory::Technical),
        difficulty: Some(Difficulty::Hard),
        kind: None,
    };
    let questions = client.questions().list_filtered(&filter).await.unwrap();
    assert_eq!(questions[0].description, "category=technical&difficulty=hard");
}

#[tokio::test]
async fn get_missing_surfaces_server_message() {
    let client = client_for(serve_fake().await, Some("tok"));
    let err = client.questions().get("missing").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Question not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_rejects_malformed_id_locally() {
    let client = client_for(serve_fake().await, Some("tok"));
    assert!(matches!(client.questions().get("a/b").await, Err(ApiError::InvalidInput(_))));
    assert!(matches!(client.questions().get("  ").await, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn create_update_delete_question() {
    let client = client_for(serve_fake().await, Some("tok"));
    let body = NewQuestion {
        title: "Lifetimes".to_owned(),
        description: "Explain 'a".to_owned(),
        category: QuestionCategory::Technical,
        difficulty: Difficulty::Hard,
        kind: "essay".to_owned(),
        options: Vec::new(),
        correct_answer: "borrow scopes".to_owned(),
        explanation: None,
        tags: vec!["rust".to_owned()],
    };

    let created = client.questions().create(&body).await.unwrap();
    assert_eq!(created.id, "q-new");
    assert_eq!(created.difficulty, Difficulty::Hard);

    let updated = client.questions().update("q7", &body).await.unwrap();
    assert_eq!(updated.id, "q7");
    assert_eq!(updated.tags, vec!["rust".to_owned()]);

    let ack = client.questions().delete("q7").await.unwrap();
    assert_eq!(ack.message, "Question deleted successfully");
}

#[tokio::test]
async fn generic_server_error_without_message() {
    let client = client_for(serve_fake().await, Some("tok"));
    let err = client.users().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, ref message } if message == "Server Error"));
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let client = client_for(serve_fake().await, Some("tok"));
    let err = client.resources().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================================
// Interviews / resources extras
// =============================================================================

#[tokio::test]
async fn schedule_interview_validates_then_posts() {
    let client = client_for(serve_fake().await, Some("tok"));
    let mut body = NewInterview {
        subject: "Graphs".to_owned(),
        kind: InterviewKind::Mock,
        scheduled_date: "2024-06-01T09:00:00Z".to_owned(),
        duration: 10,
    };
    assert!(matches!(client.schedule_interview(&body).await, Err(ApiError::InvalidInput(_))));

    body.duration = 60;
    let scheduled = client.schedule_interview(&body).await.unwrap();
    assert_eq!(scheduled.status, InterviewStatus::Scheduled);
    assert_eq!(scheduled.duration, 60);
}

#[tokio::test]
async fn submit_feedback_wraps_body_and_returns_completed() {
    let client = client_for(serve_fake().await, Some("tok"));
    let feedback = InterviewFeedback {
        rating: 5,
        comments: "great".to_owned(),
        strengths: vec!["communication".to_owned()],
        improvements: Vec::new(),
    };
    let interview = client.submit_interview_feedback("i1", &feedback).await.unwrap();
    assert_eq!(interview.id, "i1");
    assert_eq!(interview.status, InterviewStatus::Completed);
    assert_eq!(interview.feedback, Some(feedback));
}

#[tokio::test]
async fn submit_feedback_rejects_bad_rating() {
    let client = client_for(serve_fake().await, Some("tok"));
    let feedback =
        InterviewFeedback { rating: 9, comments: String::new(), strengths: Vec::new(), improvements: Vec::new() };
    assert!(matches!(
        client.submit_interview_feedback("i1", &feedback).await,
        Err(ApiError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn cancel_interview_returns_ack() {
    let client = client_for(serve_fake().await, Some("tok"));
    let ack = client.cancel_interview("i1").await.unwrap();
    assert_eq!(ack.message, "Interview cancelled successfully");
}

#[tokio::test]
async fn search_resources_passes_query() {
    let client = client_for(serve_fake().await, Some("tok"));
    let found = client.search_resources("  dynamic programming ").await.unwrap();
    assert_eq!(found[0].title, "dynamic programming");
}

#[tokio::test]
async fn search_resources_rejects_blank_query() {
    let client = client_for(serve_fake().await, Some("tok"));
    let err = client.search_resources("   ").await.unwrap_err();
    assert_eq!(err.to_string(), "Search query is required");
}
