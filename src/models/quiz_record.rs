// src/models/quiz_record.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::models::quiz::QuizData;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: i64,

    pub title: String,

    pub description: Option<String>,

    pub subject: String,

    /// Quiz content exactly as authored (single-subject object or array).
    /// Stored as JSONB.
    pub quiz_data: Json<QuizData>,

    pub created_by: Uuid,

    /// Soft-delete marker. Inactive quizzes are invisible to every read.
    pub is_active: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for authoring a quiz.
///
/// `quiz_data` stays untyped here so shape problems can be reported per path.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(default)]
    pub quiz_data: serde_json::Value,
}

/// Validated input for `Storage::create_quiz`.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub quiz_data: QuizData,
    pub created_by: Uuid,
}
