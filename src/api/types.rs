//! Wire types for the users/questions/interviews/resources endpoints.
//!
//! DESIGN
//! ======
//! Documents arrive Mongo-shaped (`_id`, camelCase, ISO timestamps). Fields
//! the server constrains to a fixed set of strings are closed enums here, so
//! an unexpected value fails decoding instead of flowing through untyped.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::session::Role;

pub const MIN_INTERVIEW_MINUTES: u32 = 15;
pub const MAX_INTERVIEW_MINUTES: u32 = 120;

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {field}: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Aptitude,
}

impl FromStr for QuestionCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(Self::Technical),
            "aptitude" => Ok(Self::Aptitude),
            other => Err(UnknownVariant { field: "category", value: other.to_owned() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(UnknownVariant { field: "difficulty", value: other.to_owned() }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewKind {
    Mock,
    Real,
}

impl FromStr for InterviewKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mock" => Ok(Self::Mock),
            "real" => Ok(Self::Real),
            other => Err(UnknownVariant { field: "interview type", value: other.to_owned() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

// =============================================================================
// USERS
// =============================================================================

/// Role on a user record. Wider than the session `Role`: administrators
/// exist server-side but never hold an app session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Student,
    Mentor,
    Admin,
}

impl AccountRole {
    /// The matching session role, if this account could sign in to the app.
    #[must_use]
    pub fn session_role(self) -> Option<Role> {
        match self {
            Self::Student => Some(Role::Student),
            Self::Mentor => Some(Role::Mentor),
            Self::Admin => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AccountRole,
}

// =============================================================================
// QUESTIONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    /// Free-form question format (e.g. `"mcq"`, `"coding"`).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Question {
    /// Whether `answer` matches the stored answer, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(self.correct_answer.trim())
    }
}

/// Body for creating or replacing a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub title: String,
    pub description: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters for `GET /questions`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuestionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<QuestionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// =============================================================================
// INTERVIEWS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    /// 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl InterviewFeedback {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(format!("rating must be between 1 and 5, got {}", self.rating))
        }
    }
}

/// A question reference inside an interview: a bare id, or the full
/// question when the server populated it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionRef {
    Id(String),
    Populated(Box<Question>),
}

impl QuestionRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated(question) => &question.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub id: QuestionRef,
    /// 0 to 10.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: InterviewKind,
    pub status: InterviewStatus,
    /// ISO 8601 timestamp.
    pub scheduled_date: String,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub feedback: Option<InterviewFeedback>,
    #[serde(default)]
    pub questions: Vec<QuestionScore>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for scheduling an interview. The server assigns owner and status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterview {
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: InterviewKind,
    pub scheduled_date: String,
    pub duration: u32,
}

impl NewInterview {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject is required".to_owned());
        }
        if !(MIN_INTERVIEW_MINUTES..=MAX_INTERVIEW_MINUTES).contains(&self.duration) {
            return Err(format!(
                "duration must be between {MIN_INTERVIEW_MINUTES} and {MAX_INTERVIEW_MINUTES} minutes, got {}",
                self.duration
            ));
        }
        Ok(())
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subject: String,
    /// Free-form resource format (e.g. `"video"`, `"article"`).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters for `GET /resources`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// `{ "message": ... }` acknowledgement returned by deletes and cancels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}
