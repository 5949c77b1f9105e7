// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::{Config, DeletePolicy},
    error::AppError,
    models::{
        quiz::parse_quiz_data,
        quiz_record::{CreateQuizRequest, NewQuiz},
        user::User,
    },
    storage::Storage,
    utils::html::{clean_html, clean_optional},
};

/// List all active quizzes, newest first. Public.
pub async fn list_quizzes(
    State(storage): State<Arc<dyn Storage>>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = storage.get_quizzes().await.map_err(|e| {
        tracing::error!("Failed to fetch quizzes: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(quizzes))
}

/// Get a single active quiz.
pub async fn get_quiz(
    State(storage): State<Arc<dyn Storage>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = storage
        .get_quiz(id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

/// Author a quiz.
///
/// The content is shape-checked path by path so an editor can point at the
/// exact question that is broken. Title and description are sanitized.
pub async fn create_quiz(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz_data = parse_quiz_data(payload.quiz_data).map_err(AppError::invalid_quiz_data)?;

    let title = clean_html(&payload.title);
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let quiz = storage
        .create_quiz(NewQuiz {
            title,
            description: clean_optional(payload.description.as_deref()),
            subject: payload.subject.trim().to_string(),
            quiz_data,
            created_by: user.id,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(quiz_id = quiz.id, user_id = %user.id, "Quiz created");
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Soft-delete a quiz. Attempts and submissions that reference it are kept.
pub async fn delete_quiz(
    State(storage): State<Arc<dyn Storage>>,
    State(config): State<Config>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = storage
        .get_quiz(id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    if quiz.created_by != user.id {
        if config.quiz_delete_policy == DeletePolicy::Owner {
            return Err(AppError::Forbidden(
                "Only the quiz creator can delete it".to_string(),
            ));
        }
        tracing::warn!(quiz_id = id, user_id = %user.id, "Quiz deleted by a non-creator");
    }

    if !storage.delete_quiz(id, user.id).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
