// src/client.rs

//! Typed client for the quiz API, used by the quiz-taking side.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use url::Url;

use crate::{
    config::ClientConfig,
    models::{
        attempt::{AttemptWithQuiz, QuizAttempt},
        quiz::{EmptyQuiz, QuizSet},
        quiz_record::QuizRecord,
        submission::{NewSubmission, QuizSubmission},
        user::User,
    },
    quiz::{
        QuizSession, SessionError, SubmissionDurability, Submitted,
        clock::Clock,
        sink::{SinkError, SubmissionSink},
    },
    utils::endpoint,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    EmptyQuiz(#[from] EmptyQuiz),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    durability: SubmissionDurability,
}

impl ApiClient {
    /// `base_url` may carry a path prefix; request paths are joined below it.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint::as_base(base_url),
            token: None,
            durability: SubmissionDurability::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(config.api_url.clone()).with_durability(config.durability);
        match &config.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        }
    }

    /// Bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_durability(mut self, durability: SubmissionDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> SubmissionDurability {
        self.durability
    }

    /// Finishes `session` and stores the result with this client's durability.
    pub async fn submit<C: Clock>(
        self: &Arc<Self>,
        session: &mut QuizSession<C>,
    ) -> Result<Submitted, SessionError> {
        session.submit_to(Arc::clone(self), self.durability).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        Self::send(self.request(Method::GET, path)?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::send(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn list_quizzes(&self) -> Result<Vec<QuizRecord>, ClientError> {
        self.get("api/quizzes").await
    }

    pub async fn get_quiz(&self, id: i64) -> Result<QuizRecord, ClientError> {
        self.get(&format!("api/quizzes/{}", id)).await
    }

    /// Fetches a quiz and normalizes its content for a [`crate::quiz::QuizSession`].
    pub async fn load_quiz_set(&self, id: i64) -> Result<QuizSet, ClientError> {
        let record = self.get_quiz(id).await?;
        Ok(QuizSet::try_from(record.quiz_data.0)?)
    }

    pub async fn record_attempt(&self, quiz_id: i64, score: i32) -> Result<QuizAttempt, ClientError> {
        self.post(
            "api/quiz-attempts",
            &json!({ "quizId": quiz_id, "score": score }),
        )
        .await
    }

    pub async fn list_attempts(&self) -> Result<Vec<AttemptWithQuiz>, ClientError> {
        self.get("api/quiz-attempts").await
    }

    pub async fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<QuizSubmission, ClientError> {
        self.post("api/quiz-submissions", submission).await
    }

    pub async fn list_submissions(&self) -> Result<Vec<QuizSubmission>, ClientError> {
        self.get("api/quiz-submissions").await
    }

    pub async fn get_submission(&self, id: i64) -> Result<QuizSubmission, ClientError> {
        self.get(&format!("api/quiz-submissions/{}", id)).await
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.get("api/user").await
    }
}

#[async_trait]
impl SubmissionSink for ApiClient {
    async fn persist(&self, submission: &NewSubmission) -> Result<(), SinkError> {
        self.create_submission(submission).await?;
        Ok(())
    }
}
