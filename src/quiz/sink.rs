// src/quiz/sink.rs

use std::str::FromStr;

use async_trait::async_trait;

use crate::models::submission::NewSubmission;

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Destination for a finished submission, usually the HTTP API.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn persist(&self, submission: &NewSubmission) -> Result<(), SinkError>;
}

/// Whether completing a quiz waits for the submission to be stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionDurability {
    /// Results are shown immediately; the store call runs in the background
    /// and a failure is only logged.
    #[default]
    BestEffort,
    /// The session completes only after the store call succeeded.
    Required,
}

impl FromStr for SubmissionDurability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" | "besteffort" => Ok(Self::BestEffort),
            "required" => Ok(Self::Required),
            other => Err(format!("unknown submission durability '{}'", other)),
        }
    }
}
