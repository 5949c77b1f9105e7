// tests/submission_tests.rs

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{TestUser, arithmetic_quiz, spawn_app, test_user};
use quizdeck::{
    client::ApiClient,
    config::ClientConfig,
    models::submission::{Difficulty, MasteryLevel},
    quiz::{
        QuizSession, SessionError, SessionState, SubmissionDurability, clock::ManualClock,
    },
};
use serde_json::{Value, json};

fn client_for(address: &str, user: &TestUser) -> ApiClient {
    ApiClient::new(address.parse().unwrap()).with_token(&user.token)
}

/// Nothing listens on port 1, so every request fails to connect.
fn unreachable_client(user: &TestUser) -> ApiClient {
    ApiClient::new("http://127.0.0.1:1".parse().unwrap()).with_token(&user.token)
}

#[tokio::test]
async fn completed_session_is_stored_with_analytics() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let client = client_for(&app.address, &ada);

    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut session = QuizSession::with_clock(set, clock.clone());

    // One subject with one chapter: straight to answering.
    assert_eq!(session.state(), SessionState::Answering);

    session.answer(0, "3").unwrap();
    session.answer(0, "4").unwrap();
    clock.advance(10);
    session.go_next().unwrap();
    session.answer(1, "$1$").unwrap();
    clock.advance(5);

    let submitted = session
        .submit_to(Arc::new(client.clone()), SubmissionDurability::Required)
        .await
        .unwrap();
    assert!(submitted.persistence.is_none());
    assert_eq!(session.state(), SessionState::Complete);
    assert_eq!(submitted.submission.score, 100);

    let stored = client.list_submissions().await.unwrap();
    assert_eq!(stored.len(), 1);
    let s = &stored[0];
    assert_eq!(s.user_id, ada.id);
    assert_eq!(s.quiz_title, "Mathematics - Basic Arithmetic");
    assert_eq!(s.correct_answers, 2);
    assert_eq!(s.analytics.first_attempt_correct, 1);
    assert_eq!(s.analytics.total_time_spent, 15);
    assert_eq!(s.analytics.average_time_per_question, 7.5);
    assert_eq!(s.analytics.difficulty_level, Difficulty::Easy);
    assert_eq!(s.analytics.question_analytics[0].attempts, 2);
    assert_eq!(s.analytics.question_analytics[0].time_spent, 10);
    assert_eq!(s.analytics.question_analytics[1].time_spent, 5);
    assert_eq!(s.submission_data[1].user_answer, "$1$");

    let fetched = client.get_submission(s.id).await.unwrap();
    assert_eq!(fetched.analytics, s.analytics);
}

#[tokio::test]
async fn best_effort_completes_when_store_fails() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let set = client_for(&app.address, &ada)
        .load_quiz_set(quiz["id"].as_i64().unwrap())
        .await
        .unwrap();

    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$2$").unwrap();

    let submitted = session
        .submit_to(
            Arc::new(unreachable_client(&ada)),
            SubmissionDurability::BestEffort,
        )
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Complete);
    assert_eq!(submitted.submission.score, 50);
    // The failure is logged, never surfaced.
    submitted.persistence.unwrap().await.unwrap();
    assert_eq!(app.storage.submission_count(), 0);
}

#[tokio::test]
async fn required_durability_keeps_the_session_open_on_failure() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let client = client_for(&app.address, &ada);
    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();

    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$1$").unwrap();

    let err = session
        .submit_to(
            Arc::new(unreachable_client(&ada)),
            SubmissionDurability::Required,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(session.state(), SessionState::Answering);
    assert!(session.result().is_none());

    // Retrying against a reachable server succeeds.
    session
        .submit_to(Arc::new(client), SubmissionDurability::Required)
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Complete);
    assert_eq!(app.storage.submission_count(), 1);
}

#[tokio::test]
async fn submissions_are_private() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let bob = test_user("bob");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let ada_client = client_for(&app.address, &ada);

    let set = ada_client
        .load_quiz_set(quiz["id"].as_i64().unwrap())
        .await
        .unwrap();
    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$1$").unwrap();
    let submission = session.finish().unwrap();
    let stored = ada_client.create_submission(&submission).await.unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/quiz-submissions/{}", stored.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Access denied" }));

    let bob_client = client_for(&app.address, &bob);
    assert!(bob_client.list_submissions().await.unwrap().is_empty());

    let missing = bob_client.get_submission(stored.id + 100).await.unwrap_err();
    assert_eq!(missing.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn inconsistent_counts_are_rejected() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let client = client_for(&app.address, &ada);

    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();
    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$2$").unwrap();
    let mut submission = session.finish().unwrap();
    submission.correct_answers = 2;

    let err = client.create_submission(&submission).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(app.storage.submission_count(), 0);
}

#[tokio::test]
async fn inflated_score_is_rejected() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let client = client_for(&app.address, &ada);

    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();
    let mut session = QuizSession::new(set);
    session.answer(0, "3").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$2$").unwrap();
    let mut submission = session.finish().unwrap();
    assert_eq!(submission.score, 0);

    submission.score = 100;
    submission.analytics.difficulty_level = Difficulty::Easy;
    submission.analytics.learning_objective_mastery.mastery_level = MasteryLevel::Mastered;

    let err = client.create_submission(&submission).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(app.storage.submission_count(), 0);
}

fn client_config(api_url: &str, user: &TestUser, durability: &str) -> ClientConfig {
    let api_url = api_url.to_string();
    let token = user.token.clone();
    let durability = durability.to_string();
    ClientConfig::from_lookup(move |key| match key {
        "QUIZDECK_API_URL" => Some(api_url.clone()),
        "QUIZDECK_TOKEN" => Some(token.clone()),
        "QUIZDECK_SUBMISSION_DURABILITY" => Some(durability.clone()),
        _ => None,
    })
}

#[tokio::test]
async fn configured_durability_drives_submission() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;

    let client = Arc::new(ApiClient::from_config(&client_config(
        &app.address,
        &ada,
        "required",
    )));
    assert_eq!(client.durability(), SubmissionDurability::Required);

    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();
    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$1$").unwrap();

    let offline = Arc::new(ApiClient::from_config(&client_config(
        "http://127.0.0.1:1",
        &ada,
        "required",
    )));
    assert!(offline.submit(&mut session).await.is_err());
    assert_eq!(session.state(), SessionState::Answering);

    let submitted = client.submit(&mut session).await.unwrap();
    assert!(submitted.persistence.is_none());
    assert_eq!(session.state(), SessionState::Complete);
    assert_eq!(app.storage.submission_count(), 1);
}

#[tokio::test]
async fn configured_best_effort_runs_in_background() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;

    let client = Arc::new(ApiClient::from_config(&client_config(
        &app.address,
        &ada,
        "best-effort",
    )));
    let set = client.load_quiz_set(quiz["id"].as_i64().unwrap()).await.unwrap();
    let mut session = QuizSession::new(set);
    session.answer(0, "4").unwrap();
    session.go_next().unwrap();
    session.answer(1, "$1$").unwrap();

    let submitted = client.submit(&mut session).await.unwrap();
    assert_eq!(session.state(), SessionState::Complete);
    submitted.persistence.unwrap().await.unwrap();
    assert_eq!(app.storage.submission_count(), 1);
}

#[tokio::test]
async fn attempts_and_profile_through_client() {
    let app = spawn_app().await;
    let ada = test_user("ada");
    let quiz = app.create_quiz(&ada, &arithmetic_quiz()).await;
    let quiz_id = quiz["id"].as_i64().unwrap();
    let client = client_for(&app.address, &ada);

    let me = client.current_user().await.unwrap();
    assert_eq!(me.id, ada.id);
    assert_eq!(me.email, ada.email);

    let attempt = client.record_attempt(quiz_id, 50).await.unwrap();
    assert_eq!(attempt.quiz_id, quiz_id);
    assert_eq!(attempt.user_id, ada.id);
    assert_eq!(attempt.score, 50);

    let attempts = client.list_attempts().await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].attempt.id, attempt.id);
    assert_eq!(attempts[0].quiz_subject.as_deref(), Some("Mathematics"));

    let err = client.record_attempt(quiz_id + 100, 50).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn submitting_requires_auth() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/quiz-submissions"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
