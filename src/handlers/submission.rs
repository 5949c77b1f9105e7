// src/handlers/submission.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{submission::NewSubmission, user::User},
    storage::Storage,
};

/// Store a detailed submission for the caller.
///
/// Counts are cross-checked against the per-question lists before anything
/// is written.
pub async fn create_submission(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
    Json(payload): Json<NewSubmission>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let submission = storage
        .create_quiz_submission(user.id, payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store quiz submission: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(
        submission_id = submission.id,
        user_id = %user.id,
        score = submission.score,
        "Quiz submission stored"
    );
    Ok((StatusCode::CREATED, Json(submission)))
}

/// The caller's submissions, newest first.
pub async fn list_submissions(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = storage.get_quiz_submissions(user.id).await?;
    Ok(Json(submissions))
}

/// A single submission. Other users' submissions are refused without
/// revealing any of their content.
pub async fn get_submission(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submission = storage
        .get_quiz_submission(id)
        .await?
        .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    if submission.user_id != user.id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(submission))
}
