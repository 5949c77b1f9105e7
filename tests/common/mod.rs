// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use quizdeck::{
    auth::{JwtIdentityProvider, ProviderIdentity, jwt::sign_token},
    config::{AuthConfig, Config, DeletePolicy},
    models::{
        attempt::{AttemptWithQuiz, NewAttempt, QuizAttempt},
        quiz_record::{NewQuiz, QuizRecord},
        submission::{NewSubmission, QuizSubmission},
        user::{NewUser, User},
    },
    routes,
    state::AppState,
    storage::{Storage, StorageError},
};
use serde_json::{Value, json};
use sqlx::types::Json;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";
pub const AUDIENCE: &str = "authenticated";

/// In-memory `Storage` with the same visibility and uniqueness rules as Postgres.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
    quizzes: Vec<QuizRecord>,
    attempts: Vec<QuizAttempt>,
    submissions: Vec<QuizSubmission>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStorage {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn quiz_is_active(&self, id: i64) -> Option<bool> {
        self.lock().quizzes.iter().find(|q| q.id == id).map(|q| q.is_active)
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut inner = self.lock();
        if inner
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(StorageError::Conflict("user".to_string()));
        }
        if user.username.is_some() && inner.users.iter().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict("Username".to_string()));
        }

        let now = Some(Utc::now());
        let created = User {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn update_username(
        &self,
        id: Uuid,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        let mut inner = self.lock();
        if inner
            .users
            .iter()
            .any(|u| u.id != id && u.username.as_deref() == Some(username))
        {
            return Err(StorageError::Conflict("Username".to_string()));
        }

        Ok(inner.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.username = Some(username.to_string());
            u.updated_at = Some(Utc::now());
            u.clone()
        }))
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<QuizRecord, StorageError> {
        let mut inner = self.lock();
        let now = Some(Utc::now());
        let record = QuizRecord {
            id: inner.next_id(),
            title: quiz.title,
            description: quiz.description,
            subject: quiz.subject,
            quiz_data: Json(quiz.quiz_data),
            created_by: quiz.created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.quizzes.push(record.clone());
        Ok(record)
    }

    async fn get_quizzes(&self) -> Result<Vec<QuizRecord>, StorageError> {
        Ok(self
            .lock()
            .quizzes
            .iter()
            .rev()
            .filter(|q| q.is_active)
            .cloned()
            .collect())
    }

    async fn get_quiz(&self, id: i64) -> Result<Option<QuizRecord>, StorageError> {
        Ok(self
            .lock()
            .quizzes
            .iter()
            .find(|q| q.id == id && q.is_active)
            .cloned())
    }

    async fn delete_quiz(&self, id: i64, _user_id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        match inner.quizzes.iter_mut().find(|q| q.id == id && q.is_active) {
            Some(quiz) => {
                quiz.is_active = false;
                quiz.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn quiz_count(&self) -> Result<i64, StorageError> {
        Ok(self.lock().quizzes.len() as i64)
    }

    async fn create_quiz_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, StorageError> {
        let mut inner = self.lock();
        let created = QuizAttempt {
            id: inner.next_id(),
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            quiz_data: Json(attempt.quiz_data.into_subjects()),
            score: attempt.score,
            timestamp: Some(Utc::now()),
        };
        inner.attempts.push(created.clone());
        Ok(created)
    }

    async fn get_quiz_attempts(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>, StorageError> {
        let inner = self.lock();
        Ok(inner
            .attempts
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .map(|a| {
                let quiz = inner.quizzes.iter().find(|q| q.id == a.quiz_id);
                AttemptWithQuiz {
                    attempt: a.clone(),
                    quiz_title: quiz.map(|q| q.title.clone()),
                    quiz_subject: quiz.map(|q| q.subject.clone()),
                }
            })
            .collect())
    }

    async fn create_quiz_submission(
        &self,
        user_id: Uuid,
        submission: NewSubmission,
    ) -> Result<QuizSubmission, StorageError> {
        let mut inner = self.lock();
        let created = QuizSubmission {
            id: inner.next_id(),
            user_id,
            quiz_title: submission.quiz_title,
            subject: submission.subject,
            chapter: submission.chapter,
            total_questions: submission.total_questions,
            correct_answers: submission.correct_answers,
            score: submission.score,
            submission_data: submission.submission_data,
            submitted_at: Some(Utc::now()),
            analytics: submission.analytics,
        };
        inner.submissions.push(created.clone());
        Ok(created)
    }

    async fn get_quiz_submissions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<QuizSubmission>, StorageError> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_quiz_submission(&self, id: i64) -> Result<Option<QuizSubmission>, StorageError> {
        Ok(self.lock().submissions.iter().find(|s| s.id == id).cloned())
    }
}

pub struct TestApp {
    pub address: String,
    pub storage: Arc<MemoryStorage>,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// A caller holding a freshly signed provider token.
pub fn test_user(name: &str) -> TestUser {
    let identity = ProviderIdentity {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name),
        username: Some(name.to_string()),
    };
    let token = sign_token(&identity, JWT_SECRET, Some(AUDIENCE), 600).unwrap();

    TestUser {
        id: identity.id,
        email: identity.email,
        token,
    }
}

pub fn test_config(policy: DeletePolicy) -> Config {
    Config {
        database_url: String::new(),
        database_max_connections: 1,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        auth: AuthConfig::Jwt {
            secret: JWT_SECRET.to_string(),
            audience: Some(AUDIENCE.to_string()),
        },
        quiz_delete_policy: policy,
        seed_sample_quiz: false,
        rust_log: "error".to_string(),
    }
}

/// Spawns the app on a random port, backed by in-memory storage.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_policy(DeletePolicy::Any).await
}

pub async fn spawn_app_with_policy(policy: DeletePolicy) -> TestApp {
    let storage = Arc::new(MemoryStorage::default());
    let identity = Arc::new(JwtIdentityProvider::new(
        JWT_SECRET,
        Some(AUDIENCE.to_string()),
    ));

    let state = AppState {
        storage: storage.clone(),
        identity,
        config: test_config(policy),
    };

    let address = serve(routes::create_router(state)).await;

    TestApp {
        address,
        storage,
        client: reqwest::Client::new(),
    }
}

/// Binds port 0 and serves `app` in the background. Returns the base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Creates a quiz through the API and returns the response body.
    pub async fn create_quiz(&self, user: &TestUser, body: &Value) -> Value {
        let response = self
            .client
            .post(self.url("/api/quizzes"))
            .bearer_auth(&user.token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }
}

pub fn arithmetic_quiz_data() -> Value {
    json!({
        "subject": "Mathematics",
        "chapters": [{
            "chapterName": "Basic Arithmetic",
            "quizQuestions": [
                {
                    "question": "What is 2 + 2?",
                    "options": ["3", "4", "5", "6"],
                    "correctAnswer": "4",
                    "explanation": "2 + 2 equals 4"
                },
                {
                    "question": "What is $\\frac{1}{2} + \\frac{1}{2}$?",
                    "options": ["$1$", "$2$", "$\\frac{1}{4}$", "$0$"],
                    "correctAnswer": "$1$",
                    "explanation": "Two halves make $1$"
                }
            ]
        }]
    })
}

pub fn arithmetic_quiz() -> Value {
    json!({
        "title": "Basic Math Quiz",
        "description": "A simple quiz to test basic arithmetic skills",
        "subject": "Mathematics",
        "quizData": arithmetic_quiz_data()
    })
}
