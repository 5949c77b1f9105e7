// src/quiz/session.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::{
    models::{
        quiz::{Chapter, Question, Quiz, QuizSet},
        submission::NewSubmission,
    },
    quiz::{
        builder::{SubmissionInput, build_submission},
        clock::{Clock, SystemClock},
        sink::{SinkError, SubmissionDurability, SubmissionSink},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Choosing a subject and/or chapter.
    Selecting,
    /// The current question has no reveal active.
    Answering,
    /// The correct answer of the current question is shown.
    Revealed,
    /// Submitted. Terminal.
    Complete,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
    #[error("unknown chapter '{0}'")]
    UnknownChapter(String),
    #[error("no chapter is selected")]
    NoActiveChapter,
    #[error("question {0} does not exist")]
    QuestionOutOfRange(usize),
    #[error("the current question has no answer to reveal")]
    NoAnswerToReveal,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("already at the last question")]
    AtLastQuestion,
    /// 1-based positions of the questions still missing an answer.
    #[error("questions not answered yet: {0:?}")]
    Unanswered(Vec<usize>),
    #[error("failed to persist submission: {0}")]
    Persistence(SinkError),
}

/// Outcome of [`QuizSession::submit_to`].
#[derive(Debug)]
pub struct Submitted {
    pub submission: NewSubmission,
    /// Background store task, only for best-effort submissions.
    pub persistence: Option<JoinHandle<()>>,
}

/// One run through one chapter of a quiz.
///
/// Owns all in-progress data (answers, first answers, attempt counts and
/// per-question times). Nothing is shared; dropping the session discards it.
pub struct QuizSession<C = SystemClock> {
    quiz: QuizSet,
    clock: C,
    state: SessionState,
    subject_selectable: bool,
    subject_idx: usize,
    chapter_idx: Option<usize>,
    index: usize,
    answers: Vec<Option<String>>,
    first_answers: Vec<Option<String>>,
    attempts: Vec<u32>,
    times: Vec<Option<u64>>,
    hints_used: u32,
    review_count: u32,
    started_at: DateTime<Utc>,
    entered_at: DateTime<Utc>,
    result: Option<NewSubmission>,
}

impl QuizSession<SystemClock> {
    pub fn new(quiz: QuizSet) -> Self {
        Self::with_clock(quiz, SystemClock)
    }
}

impl<C: Clock> QuizSession<C> {
    pub fn with_clock(quiz: QuizSet, clock: C) -> Self {
        Self::build(quiz, 0, false, clock)
    }

    /// Starts on a fixed subject; only its chapters remain selectable.
    pub fn for_subject(quiz: QuizSet, subject: &str, clock: C) -> Result<Self, SessionError> {
        let idx = quiz
            .subjects()
            .iter()
            .position(|s| s.subject == subject)
            .ok_or_else(|| SessionError::UnknownSubject(subject.to_string()))?;
        Ok(Self::build(quiz, idx, true, clock))
    }

    fn build(quiz: QuizSet, subject_idx: usize, preselected: bool, clock: C) -> Self {
        let now = clock.now();
        let subject_selectable = !preselected && quiz.subjects().len() > 1;
        let chapters = quiz.subjects()[subject_idx].chapters.len();
        let state = if subject_selectable || chapters > 1 {
            SessionState::Selecting
        } else {
            SessionState::Answering
        };

        let mut session = Self {
            quiz,
            clock,
            state,
            subject_selectable,
            subject_idx,
            chapter_idx: (chapters > 0).then_some(0),
            index: 0,
            answers: Vec::new(),
            first_answers: Vec::new(),
            attempts: Vec::new(),
            times: Vec::new(),
            hints_used: 0,
            review_count: 0,
            started_at: now,
            entered_at: now,
            result: None,
        };
        session.reset_records();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn subjects(&self) -> &[Quiz] {
        self.quiz.subjects()
    }

    /// Whether a subject choice is offered.
    pub fn subject_selectable(&self) -> bool {
        self.subject_selectable
    }

    /// Whether a chapter choice is offered.
    pub fn chapter_selectable(&self) -> bool {
        self.active_subject().chapters.len() > 1
    }

    pub fn active_subject(&self) -> &Quiz {
        &self.quiz.subjects()[self.subject_idx]
    }

    pub fn active_chapter(&self) -> Option<&Chapter> {
        self.chapter_idx
            .and_then(|idx| self.active_subject().chapters.get(idx))
    }

    pub fn questions(&self) -> &[Question] {
        self.active_chapter()
            .map(|c| c.quiz_questions.as_slice())
            .unwrap_or_default()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.index)
    }

    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }

    pub fn first_answer_for(&self, index: usize) -> Option<&str> {
        self.first_answers.get(index).and_then(|a| a.as_deref())
    }

    pub fn attempts_for(&self, index: usize) -> u32 {
        self.attempts.get(index).copied().unwrap_or(0)
    }

    pub fn time_for(&self, index: usize) -> Option<u64> {
        self.times.get(index).copied().flatten()
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    /// The correct answer is visible, either by request or because results are shown.
    pub fn is_revealed(&self) -> bool {
        matches!(self.state, SessionState::Revealed | SessionState::Complete)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, SessionState::Answering | SessionState::Revealed)
            && self.active_chapter().is_some()
            && self.answers.iter().all(Option::is_some)
    }

    /// The submission computed on completion.
    pub fn result(&self) -> Option<&NewSubmission> {
        self.result.as_ref()
    }

    pub fn select_subject(&mut self, name: &str) -> Result<(), SessionError> {
        self.expect("select a subject", &[SessionState::Selecting])?;
        if !self.subject_selectable {
            return Err(SessionError::InvalidState {
                operation: "select a subject",
                state: self.state,
            });
        }
        let idx = self
            .quiz
            .subjects()
            .iter()
            .position(|s| s.subject == name)
            .ok_or_else(|| SessionError::UnknownSubject(name.to_string()))?;

        self.subject_idx = idx;
        self.chapter_idx = (!self.active_subject().chapters.is_empty()).then_some(0);
        self.reset_records();
        Ok(())
    }

    pub fn select_chapter(&mut self, name: &str) -> Result<(), SessionError> {
        self.expect("select a chapter", &[SessionState::Selecting])?;
        let idx = self
            .active_subject()
            .chapters
            .iter()
            .position(|c| c.chapter_name == name)
            .ok_or_else(|| SessionError::UnknownChapter(name.to_string()))?;

        self.chapter_idx = Some(idx);
        self.reset_records();
        Ok(())
    }

    /// Leaves selection and starts the clock on the first question.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect("start", &[SessionState::Selecting])?;
        if self.active_chapter().is_none() {
            return Err(SessionError::NoActiveChapter);
        }
        let now = self.clock.now();
        self.started_at = now;
        self.entered_at = now;
        self.state = SessionState::Answering;
        Ok(())
    }

    /// Records `option` for the question at `question_index`.
    ///
    /// The first answer given to a question is frozen for first-attempt
    /// analytics; later calls only replace the current answer and count attempts.
    /// Membership of `option` in the question's options is not checked.
    pub fn answer(
        &mut self,
        question_index: usize,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.expect("answer", &[SessionState::Answering, SessionState::Revealed])?;
        if question_index >= self.questions().len() {
            return Err(SessionError::QuestionOutOfRange(question_index));
        }

        let option = option.into();
        if self.answers[question_index].is_none() {
            self.first_answers[question_index] = Some(option.clone());
            self.attempts[question_index] = 1;
        } else {
            self.attempts[question_index] += 1;
        }
        self.answers[question_index] = Some(option);
        self.state = SessionState::Answering;
        Ok(())
    }

    /// Shows the correct answer of the current question. Every call counts as a hint.
    pub fn reveal_answer(&mut self) -> Result<(), SessionError> {
        self.expect(
            "reveal an answer",
            &[SessionState::Answering, SessionState::Revealed],
        )?;
        if self.answer_for(self.index).is_none() {
            return Err(SessionError::NoAnswerToReveal);
        }
        self.state = SessionState::Revealed;
        self.hints_used += 1;
        Ok(())
    }

    pub fn go_next(&mut self) -> Result<(), SessionError> {
        self.expect("move", &[SessionState::Answering, SessionState::Revealed])?;
        if self.index + 1 >= self.questions().len() {
            return Err(SessionError::AtLastQuestion);
        }
        self.leave_current();
        self.index += 1;
        Ok(())
    }

    /// Steps back one question. Going back counts as a review.
    pub fn go_previous(&mut self) -> Result<(), SessionError> {
        self.expect("move", &[SessionState::Answering, SessionState::Revealed])?;
        if self.index == 0 {
            return Err(SessionError::AtFirstQuestion);
        }
        self.leave_current();
        self.index -= 1;
        self.review_count += 1;
        Ok(())
    }

    /// Scores the run, derives its analytics and completes the session.
    pub fn finish(&mut self) -> Result<NewSubmission, SessionError> {
        let (times, submission) = self.prepare()?;
        self.commit(times, submission.clone());
        Ok(submission)
    }

    /// Completes the session and hands the submission to `sink`.
    ///
    /// With [`SubmissionDurability::BestEffort`] the session completes at once
    /// and the sink runs on a spawned task whose failure is logged and
    /// dropped. With [`SubmissionDurability::Required`] a sink failure is
    /// returned and the session stays where it was.
    pub async fn submit_to<S>(
        &mut self,
        sink: Arc<S>,
        durability: SubmissionDurability,
    ) -> Result<Submitted, SessionError>
    where
        S: SubmissionSink + ?Sized + 'static,
    {
        let (times, submission) = self.prepare()?;

        match durability {
            SubmissionDurability::Required => {
                sink.persist(&submission)
                    .await
                    .map_err(SessionError::Persistence)?;
                self.commit(times, submission.clone());
                tracing::info!(score = submission.score, "Quiz submission stored");
                Ok(Submitted {
                    submission,
                    persistence: None,
                })
            }
            SubmissionDurability::BestEffort => {
                self.commit(times, submission.clone());
                let payload = submission.clone();
                let handle = tokio::spawn(async move {
                    match sink.persist(&payload).await {
                        Ok(()) => tracing::info!(score = payload.score, "Quiz submission stored"),
                        Err(e) => tracing::error!("Failed to submit quiz: {}", e),
                    }
                });
                Ok(Submitted {
                    submission,
                    persistence: Some(handle),
                })
            }
        }
    }

    fn prepare(&self) -> Result<(Vec<Option<u64>>, NewSubmission), SessionError> {
        self.expect("submit", &[SessionState::Answering, SessionState::Revealed])?;
        let chapter = self.active_chapter().ok_or(SessionError::NoActiveChapter)?;

        let unanswered: Vec<usize> = self
            .answers
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_none())
            .map(|(i, _)| i + 1)
            .collect();
        if !unanswered.is_empty() {
            return Err(SessionError::Unanswered(unanswered));
        }

        let now = self.clock.now();
        let mut times = self.times.clone();
        if let Some(slot) = times.get_mut(self.index) {
            *slot = Some(elapsed_seconds(self.entered_at, now));
        }

        let submission = build_submission(&SubmissionInput {
            subject: &self.active_subject().subject,
            chapter,
            answers: &self.answers,
            first_answers: &self.first_answers,
            attempts: &self.attempts,
            times: &times,
            hints_used: self.hints_used,
            review_count: self.review_count,
            started_at: self.started_at,
            finished_at: now,
        });
        Ok((times, submission))
    }

    fn commit(&mut self, times: Vec<Option<u64>>, submission: NewSubmission) {
        self.times = times;
        self.result = Some(submission);
        self.state = SessionState::Complete;
    }

    /// Stores the time spent on the current question, overwriting an earlier
    /// visit, and prepares the entry time for the next one.
    fn leave_current(&mut self) {
        let now = self.clock.now();
        if let Some(slot) = self.times.get_mut(self.index) {
            *slot = Some(elapsed_seconds(self.entered_at, now));
        }
        self.entered_at = now;
        self.state = SessionState::Answering;
    }

    fn reset_records(&mut self) {
        let len = self.questions().len();
        self.index = 0;
        self.answers = vec![None; len];
        self.first_answers = vec![None; len];
        self.attempts = vec![0; len];
        self.times = vec![None; len];
    }

    fn expect(&self, operation: &'static str, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}
