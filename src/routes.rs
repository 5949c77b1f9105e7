// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::auth_middleware,
    handlers::{attempt, quiz, submission, user},
    state::AppState,
};

/// Assembles the main application router.
///
/// * The quiz list and the health probe are public.
/// * Everything that reads or writes per-user data sits behind `auth_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    // Listing is public, everything else needs a caller.
    let quiz_routes = Router::new()
        .route(
            "/",
            get(quiz::list_quizzes).merge(post(quiz::create_quiz).route_layer(auth.clone())),
        )
        .route(
            "/{id}",
            get(quiz::get_quiz)
                .delete(quiz::delete_quiz)
                .route_layer(auth.clone()),
        );

    let attempt_routes = Router::new()
        .route("/", get(attempt::list_attempts).post(attempt::create_attempt))
        .route_layer(auth.clone());

    let submission_routes = Router::new()
        .route(
            "/",
            get(submission::list_submissions).post(submission::create_submission),
        )
        .route("/{id}", get(submission::get_submission))
        .route_layer(auth.clone());

    let user_routes = Router::new()
        .route("/", get(user::get_user))
        .route("/profile", put(user::update_profile))
        .route_layer(auth);

    Router::new()
        .route("/api/health", get(user::health))
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/quiz-attempts", attempt_routes)
        .nest("/api/quiz-submissions", submission_routes)
        .nest("/api/user", user_routes)
        // Global Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
