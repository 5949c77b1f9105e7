// src/models/submission.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::quiz::analytics;

/// Tri-state difficulty label.
///
/// Used for the overall `difficultyLevel` (derived from the score) and for each
/// question (derived from its time relative to the session average).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    Developing,
    Proficient,
    Mastered,
}

/// Frozen snapshot of one question as it was shown and answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub explanation: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalytics {
    /// 1-based position within the chapter.
    #[validate(range(min = 1))]
    pub question_index: i32,
    #[validate(range(min = 0))]
    pub time_spent: i32,
    #[validate(range(min = 1))]
    pub attempts: i32,
    pub is_correct: bool,
    pub is_first_attempt_correct: bool,
    pub difficulty: Difficulty,
    #[validate(range(min = 2, max = 5))]
    pub confidence_level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjectiveMastery {
    pub subject: String,
    pub chapter: String,
    pub mastery_level: MasteryLevel,
    /// 1-based indices of the questions answered incorrectly.
    pub concepts_struggled: Vec<i32>,
}

/// Analytics block attached to every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAnalytics {
    #[validate(range(min = 0))]
    pub total_time_spent: i32,
    #[validate(range(min = 0.0))]
    pub average_time_per_question: f64,
    #[sqlx(try_from = "String")]
    pub difficulty_level: Difficulty,
    #[validate(range(min = 0.0, max = 100.0))]
    pub completion_percentage: f64,
    #[validate(range(min = 0))]
    pub streak_correct: i32,
    #[validate(range(min = 0))]
    pub streak_incorrect: i32,
    #[validate(range(min = 0))]
    pub first_attempt_correct: i32,
    #[validate(range(min = 0))]
    pub questions_skipped: i32,
    #[validate(range(min = 0))]
    pub hints_used: i32,
    #[validate(range(min = 0))]
    pub review_count: i32,
    #[validate(range(min = 2.0, max = 5.0))]
    pub confidence_score: f64,
    #[sqlx(json)]
    pub learning_objective_mastery: LearningObjectiveMastery,
    #[sqlx(json)]
    #[validate(nested)]
    pub question_analytics: Vec<QuestionAnalytics>,
}

/// Submission payload produced when a quiz session completes.
///
/// This is the body of `POST /api/quiz-submissions`; the server adds the owner,
/// id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_submission_counts))]
pub struct NewSubmission {
    #[validate(length(min = 1, max = 300))]
    pub quiz_title: String,
    #[validate(length(max = 200))]
    pub subject: String,
    #[validate(length(max = 200))]
    pub chapter: String,
    #[validate(range(min = 0))]
    pub total_questions: i32,
    #[validate(range(min = 0))]
    pub correct_answers: i32,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    pub submission_data: Vec<QuestionResult>,
    #[serde(flatten)]
    #[validate(nested)]
    pub analytics: SubmissionAnalytics,
}

/// Cross-field checks: every count must agree with the question list.
fn validate_submission_counts(s: &NewSubmission) -> Result<(), ValidationError> {
    let total = s.total_questions;

    if s.submission_data.len() as i32 != total {
        return Err(ValidationError::new("submission_data_length_mismatch"));
    }
    if s.analytics.question_analytics.len() as i32 != total {
        return Err(ValidationError::new("question_analytics_length_mismatch"));
    }

    if s
        .submission_data
        .iter()
        .any(|r| r.is_correct != (r.user_answer == r.correct_answer))
    {
        return Err(ValidationError::new("is_correct_mismatch"));
    }

    let correct = s.submission_data.iter().filter(|r| r.is_correct).count();
    if s.correct_answers != correct as i32 {
        return Err(ValidationError::new("correct_answers_mismatch"));
    }
    if s.score != analytics::score_percentage(correct, total as usize) {
        return Err(ValidationError::new("score_mismatch"));
    }

    let a = &s.analytics;
    if a.streak_correct > total || a.streak_incorrect > total || a.first_attempt_correct > total {
        return Err(ValidationError::new("count_exceeds_total_questions"));
    }
    if a.difficulty_level != analytics::overall_difficulty(s.score)
        || a.learning_objective_mastery.mastery_level != analytics::mastery_level(s.score)
    {
        return Err(ValidationError::new("score_label_mismatch"));
    }
    Ok(())
}

/// Represents the 'quiz_submissions' table in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub id: i64,
    pub user_id: Uuid,
    pub quiz_title: String,
    pub subject: String,
    pub chapter: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub score: i32,
    #[sqlx(json)]
    pub submission_data: Vec<QuestionResult>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub analytics: SubmissionAnalytics,
}
