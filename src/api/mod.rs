//! Bearer-authenticated client for the users/questions/interviews/resources
//! REST surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reads the token from the credential store on every call. Requests are
//! never sent without one. A 401 from the server is returned to the caller
//! as-is; this layer does not log the user out.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod types;

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use types::{
    AccountRole, Ack, Difficulty, Interview, InterviewFeedback, InterviewKind, InterviewStatus, NewInterview,
    NewQuestion, Question, QuestionCategory, QuestionFilter, QuestionRef, QuestionScore, Resource, ResourceFilter,
    User,
};

use crate::config::ClientConfig;
use crate::gateway::server_message;
use crate::session::CredentialStore;

const GENERIC_SERVER_ERROR: &str = "Server Error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// True for a missing local token or a server-side 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Status { status: 401, .. })
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: CredentialStore,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, credentials: CredentialStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()?;
        Ok(Self { http, config, credentials })
    }

    #[must_use]
    pub fn users(&self) -> Collection<'_, User> {
        Collection::new(self, "users")
    }

    #[must_use]
    pub fn questions(&self) -> Collection<'_, Question> {
        Collection::new(self, "questions")
    }

    #[must_use]
    pub fn interviews(&self) -> Collection<'_, Interview> {
        Collection::new(self, "interviews")
    }

    #[must_use]
    pub fn resources(&self) -> Collection<'_, Resource> {
        Collection::new(self, "resources")
    }

    /// `POST /interviews` after checking subject and duration locally.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` before sending, or any request failure.
    pub async fn schedule_interview(&self, interview: &NewInterview) -> Result<Interview, ApiError> {
        interview.validate().map_err(ApiError::InvalidInput)?;
        self.interviews().create(interview).await
    }

    /// `DELETE /interviews/{id}`; the server marks it cancelled.
    ///
    /// # Errors
    ///
    /// Returns any request failure.
    pub async fn cancel_interview(&self, id: &str) -> Result<Ack, ApiError> {
        self.interviews().delete(id).await
    }

    /// `POST /interviews/{id}/feedback`; the server marks it completed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an out-of-range rating, or any request failure.
    pub async fn submit_interview_feedback(&self, id: &str, feedback: &InterviewFeedback) -> Result<Interview, ApiError> {
        #[derive(Serialize)]
        struct FeedbackBody<'a> {
            feedback: &'a InterviewFeedback,
        }

        feedback.validate().map_err(ApiError::InvalidInput)?;
        let path = format!("interviews/{}/feedback", checked_id(id)?);
        let request = self.request(Method::POST, &path)?.json(&FeedbackBody { feedback });
        execute(request).await
    }

    /// `GET /resources/search?q=`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank query, or any request failure.
    pub async fn search_resources(&self, query: &str) -> Result<Vec<Resource>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidInput("Search query is required".to_owned()));
        }
        let request = self.request(Method::GET, "resources/search")?.query(&[("q", query)]);
        execute(request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.credentials.token().ok_or(ApiError::Unauthenticated)?;
        let url = self.config.endpoint(path);
        tracing::debug!(%method, %url, "api request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

async fn execute<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let url = response.url().clone();
    let text = response.text().await?;

    if !status.is_success() {
        let message = server_message(&text).unwrap_or_else(|| GENERIC_SERVER_ERROR.to_owned());
        tracing::warn!(%url, status = status.as_u16(), %message, "api request rejected");
        return Err(ApiError::Status { status: status.as_u16(), message });
    }
    Ok(serde_json::from_str(&text)?)
}

fn checked_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidInput(format!("invalid id: {id:?}")));
    }
    Ok(id)
}

// =============================================================================
// COLLECTION
// =============================================================================

/// Standard list/get/create/update/delete over one resource path.
pub struct Collection<'a, T> {
    client: &'a ApiClient,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Collection<'a, T> {
    fn new(client: &'a ApiClient, path: &'static str) -> Self {
        Self { client, path, _item: PhantomData }
    }

    /// # Errors
    ///
    /// Returns any request failure.
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        let request = self.client.request(Method::GET, self.path)?;
        execute(request).await
    }

    /// List with query-string filters such as `QuestionFilter`.
    ///
    /// # Errors
    ///
    /// Returns any request failure.
    pub async fn list_filtered<Q: Serialize + ?Sized>(&self, filter: &Q) -> Result<Vec<T>, ApiError> {
        let request = self.client.request(Method::GET, self.path)?.query(filter);
        execute(request).await
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed id, or any request failure.
    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        let path = self.item_path(id)?;
        let request = self.client.request(Method::GET, &path)?;
        execute(request).await
    }

    /// # Errors
    ///
    /// Returns any request failure.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, ApiError> {
        let request = self.client.request(Method::POST, self.path)?.json(body);
        execute(request).await
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed id, or any request failure.
    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<T, ApiError> {
        let path = self.item_path(id)?;
        let request = self.client.request(Method::PUT, &path)?.json(body);
        execute(request).await
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed id, or any request failure.
    pub async fn delete(&self, id: &str) -> Result<Ack, ApiError> {
        let path = self.item_path(id)?;
        let request = self.client.request(Method::DELETE, &path)?;
        execute(request).await
    }

    fn item_path(&self, id: &str) -> Result<String, ApiError> {
        Ok(format!("{}/{}", self.path, checked_id(id)?))
    }
}
