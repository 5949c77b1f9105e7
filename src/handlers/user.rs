// src/handlers/user.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateProfileRequest, User},
    storage::Storage,
};

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// The authenticated caller as stored locally.
pub async fn get_user(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(user)
}

/// Change the caller's username. Usernames are unique.
pub async fn update_profile(
    State(storage): State<Arc<dyn Storage>>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    payload.validate()?;

    let updated = storage
        .update_username(user.id, username)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Username updated");
    Ok(Json(updated))
}
