// src/storage/mod.rs

//! Persistence gateway. Handlers and the auth layer only see the
//! [`Storage`] trait; [`PgStorage`] is the production implementation.

mod postgres;

pub use postgres::PgStorage;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    attempt::{AttemptWithQuiz, NewAttempt, QuizAttempt},
    quiz_record::{NewQuiz, QuizRecord},
    submission::{NewSubmission, QuizSubmission},
    user::{NewUser, User},
};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint was hit. Carries the conflicting field.
    #[error("{0} already exists")]
    Conflict(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;
    async fn update_username(&self, id: Uuid, username: &str)
    -> Result<Option<User>, StorageError>;

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<QuizRecord, StorageError>;
    /// Active quizzes, newest first.
    async fn get_quizzes(&self) -> Result<Vec<QuizRecord>, StorageError>;
    /// `None` for unknown and soft-deleted quizzes alike.
    async fn get_quiz(&self, id: i64) -> Result<Option<QuizRecord>, StorageError>;
    /// Soft delete. Returns whether an active quiz was deactivated.
    async fn delete_quiz(&self, id: i64, user_id: Uuid) -> Result<bool, StorageError>;
    async fn quiz_count(&self) -> Result<i64, StorageError>;

    async fn create_quiz_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, StorageError>;
    /// The user's attempts, newest first, with the source quiz's title and subject.
    async fn get_quiz_attempts(&self, user_id: Uuid)
    -> Result<Vec<AttemptWithQuiz>, StorageError>;

    async fn create_quiz_submission(
        &self,
        user_id: Uuid,
        submission: NewSubmission,
    ) -> Result<QuizSubmission, StorageError>;
    async fn get_quiz_submissions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<QuizSubmission>, StorageError>;
    async fn get_quiz_submission(&self, id: i64) -> Result<Option<QuizSubmission>, StorageError>;

    /// Returns the stored user, creating it on first sight.
    ///
    /// Two first requests can race; the loser re-reads the row the winner wrote.
    /// If the provider's username is already taken locally the user is
    /// created without one.
    async fn sync_user(&self, user: NewUser) -> Result<User, StorageError> {
        if let Some(existing) = self.get_user(user.id).await? {
            return Ok(existing);
        }

        let retry = NewUser {
            username: None,
            ..user.clone()
        };
        let had_username = user.username.is_some();

        match self.create_user(user).await {
            Ok(created) => Ok(created),
            Err(StorageError::Conflict(field)) => {
                if let Some(existing) = self.get_user(retry.id).await? {
                    return Ok(existing);
                }
                if !had_username {
                    return Err(StorageError::Conflict(field));
                }
                tracing::warn!(user_id = %retry.id, "Provider username taken, syncing without it");
                self.create_user(retry).await
            }
            Err(e) => Err(e),
        }
    }
}
