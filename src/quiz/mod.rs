// src/quiz/mod.rs

//! Client-side quiz taking: the session state machine and everything it
//! derives when a run completes.

pub mod analytics;
pub mod builder;
pub mod clock;
pub mod session;
pub mod sink;

pub use session::{QuizSession, SessionError, SessionState, Submitted};
pub use sink::{SubmissionDurability, SubmissionSink};
