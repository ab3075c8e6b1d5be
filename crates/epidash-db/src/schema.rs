//! Row types and table names.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const TABLE_DISEASES: &str = "diseases";
pub const TABLE_QUESTIONS: &str = "questions";
pub const TABLE_CHOICES: &str = "choices";
pub const TABLE_RESPONSES: &str = "responses";

/// Schema applied by [`crate::Database::initialize`]. Idempotent.
pub(crate) const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS diseases (
    disease_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    disease_name TEXT NOT NULL UNIQUE,
    description  TEXT,
    is_active    INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS questions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    disease_id    INTEGER NOT NULL REFERENCES diseases(disease_id),
    question_text TEXT NOT NULL,
    "order"       INTEGER NOT NULL DEFAULT 0,
    is_active     INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS choices (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id  INTEGER NOT NULL REFERENCES questions(id),
    choice_text  TEXT NOT NULL,
    choice_order INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS responses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    responder_id TEXT NOT NULL,
    disease_id   INTEGER NOT NULL REFERENCES diseases(disease_id),
    question_id  INTEGER NOT NULL REFERENCES questions(id),
    choice_id    INTEGER NOT NULL REFERENCES choices(id),
    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_responses_disease ON responses(disease_id);
CREATE INDEX IF NOT EXISTS idx_responses_question ON responses(question_id);
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Disease {
    pub disease_id: i64,
    pub disease_name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub disease_id: i64,
    pub question_text: String,
    pub order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub choice_order: i64,
}

/// One answer joined with its disease, question and choice text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResponseRecord {
    pub id: i64,
    pub responder_id: String,
    pub disease_name: String,
    pub question_text: String,
    pub choice_text: String,
    pub created_at: NaiveDateTime,
}

/// Optional narrowing for [`crate::ResponseRepository::responses`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFilter {
    /// Exact disease names.
    pub diseases: Vec<String>,
    pub question_ids: Vec<i64>,
}

/// One respondent's answer inside a disease group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedResponse {
    pub responder_id: String,
    pub question: String,
    pub answer: String,
}

/// `disease_name → answers`, as served by `/api/diseases-groups`.
pub type GroupedResponses = BTreeMap<String, Vec<GroupedResponse>>;

/// Raw shape of the grouped analytics query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AnalyticsRow {
    pub disease_name: Option<String>,
    pub question_text: Option<String>,
    pub choice_text: Option<String>,
    pub response_count: Option<i64>,
}

impl From<AnalyticsRow> for epidash_analytics::RawResponseRow {
    fn from(row: AnalyticsRow) -> Self {
        Self {
            disease_name: row.disease_name,
            question_text: row.question_text,
            choice_text: row.choice_text,
            response_count: row.response_count,
        }
    }
}
