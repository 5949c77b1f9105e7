// src/handlers/attempt.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::{CreateAttemptRequest, NewAttempt},
        user::User,
    },
    storage::Storage,
};

/// Record a completed run. The quiz content is snapshotted server-side so the
/// attempt stays readable after the quiz changes or is deleted.
pub async fn create_attempt(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = storage
        .get_quiz(payload.quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let attempt = storage
        .create_quiz_attempt(NewAttempt {
            user_id: user.id,
            quiz_id: quiz.id,
            quiz_data: quiz.quiz_data.0,
            score: payload.score,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to record quiz attempt: {:?}", e);
            AppError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// The caller's attempts, newest first.
pub async fn list_attempts(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = storage.get_quiz_attempts(user.id).await?;
    Ok(Json(attempts))
}
