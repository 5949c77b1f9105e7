// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::models::quiz::{Quiz, QuizData};

/// Represents the 'quiz_attempts' table in the database.
/// A coarse record of one completed run: score plus a content snapshot.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: Uuid,
    pub quiz_id: i64,
    /// Always the sequence form, whatever shape the quiz was authored in.
    pub quiz_data: Json<Vec<Quiz>>,
    pub score: i32,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// An attempt joined with the quiz it was taken from.
/// Title and subject are `None` when the quiz row no longer exists.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptWithQuiz {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attempt: QuizAttempt,
    pub quiz_title: Option<String>,
    pub quiz_subject: Option<String>,
}

/// DTO for recording an attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttemptRequest {
    pub quiz_id: i64,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: Uuid,
    pub quiz_id: i64,
    pub quiz_data: QuizData,
    pub score: i32,
}
