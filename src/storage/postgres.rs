// src/storage/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::{Storage, StorageError};
use crate::models::{
    attempt::{AttemptWithQuiz, NewAttempt, QuizAttempt},
    quiz_record::{NewQuiz, QuizRecord},
    submission::{NewSubmission, QuizSubmission},
    user::{NewUser, User},
};

const QUIZ_COLUMNS: &str =
    "id, title, description, subject, quiz_data, created_by, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres error code for unique violation is 23505.
fn unique_violation(e: sqlx::Error, field: &str) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict(field.to_string())
        }
        _ => StorageError::Database(e),
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, username)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "user"))
    }

    async fn update_username(
        &self,
        id: Uuid,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, username, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Username"))
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<QuizRecord, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO quizzes (title, description, subject, quiz_data, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {QUIZ_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, QuizRecord>(&sql)
            .bind(&quiz.title)
            .bind(&quiz.description)
            .bind(&quiz.subject)
            .bind(Json(&quiz.quiz_data))
            .bind(quiz.created_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn get_quizzes(&self) -> Result<Vec<QuizRecord>, StorageError> {
        let sql = format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE is_active ORDER BY created_at DESC, id DESC"
        );

        let quizzes = sqlx::query_as::<_, QuizRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(quizzes)
    }

    async fn get_quiz(&self, id: i64) -> Result<Option<QuizRecord>, StorageError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1 AND is_active");

        let quiz = sqlx::query_as::<_, QuizRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quiz)
    }

    async fn delete_quiz(&self, id: i64, user_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE quizzes SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(quiz_id = id, %user_id, rows = result.rows_affected(), "quiz deactivated");
        Ok(result.rows_affected() > 0)
    }

    async fn quiz_count(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_quiz_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, StorageError> {
        let snapshot = attempt.quiz_data.into_subjects();

        let created = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, quiz_id, quiz_data, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, quiz_id, quiz_data, score, timestamp
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .bind(Json(snapshot))
        .bind(attempt.score)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_quiz_attempts(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>, StorageError> {
        let attempts = sqlx::query_as::<_, AttemptWithQuiz>(
            r#"
            SELECT
                a.id, a.user_id, a.quiz_id, a.quiz_data, a.score, a.timestamp,
                q.title AS quiz_title,
                q.subject AS quiz_subject
            FROM quiz_attempts a
            LEFT JOIN quizzes q ON q.id = a.quiz_id
            WHERE a.user_id = $1
            ORDER BY a.timestamp DESC, a.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn create_quiz_submission(
        &self,
        user_id: Uuid,
        submission: NewSubmission,
    ) -> Result<QuizSubmission, StorageError> {
        let a = &submission.analytics;

        let created = sqlx::query_as::<_, QuizSubmission>(
            r#"
            INSERT INTO quiz_submissions (
                user_id, quiz_title, subject, chapter,
                total_questions, correct_answers, score, submission_data,
                total_time_spent, average_time_per_question, difficulty_level,
                completion_percentage, streak_correct, streak_incorrect,
                first_attempt_correct, questions_skipped, hints_used, review_count,
                confidence_score, learning_objective_mastery, question_analytics
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&submission.quiz_title)
        .bind(&submission.subject)
        .bind(&submission.chapter)
        .bind(submission.total_questions)
        .bind(submission.correct_answers)
        .bind(submission.score)
        .bind(Json(&submission.submission_data))
        .bind(a.total_time_spent)
        .bind(a.average_time_per_question)
        .bind(a.difficulty_level.as_str())
        .bind(a.completion_percentage)
        .bind(a.streak_correct)
        .bind(a.streak_incorrect)
        .bind(a.first_attempt_correct)
        .bind(a.questions_skipped)
        .bind(a.hints_used)
        .bind(a.review_count)
        .bind(a.confidence_score)
        .bind(Json(&a.learning_objective_mastery))
        .bind(Json(&a.question_analytics))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_quiz_submissions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<QuizSubmission>, StorageError> {
        let submissions = sqlx::query_as::<_, QuizSubmission>(
            "SELECT * FROM quiz_submissions WHERE user_id = $1 ORDER BY submitted_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn get_quiz_submission(&self, id: i64) -> Result<Option<QuizSubmission>, StorageError> {
        let submission =
            sqlx::query_as::<_, QuizSubmission>("SELECT * FROM quiz_submissions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(submission)
    }
}
