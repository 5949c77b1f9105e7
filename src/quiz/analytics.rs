// src/quiz/analytics.rs

//! Reductions over a finished run: scoring, streaks and the derived labels.

use crate::models::{
    quiz::Question,
    submission::{Difficulty, MasteryLevel},
};

/// Exact string match against the correct answer. No trimming, no case folding.
pub fn is_correct(question: &Question, answer: Option<&str>) -> bool {
    answer == Some(question.correct_answer.as_str())
}

/// Integer percentage, rounded half up. An empty chapter scores 0.
pub fn score_percentage(correct: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 * 100.0 / total as f64).round() as i32
}

/// Longest runs of correct and incorrect answers, in question order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Streaks {
    pub correct: usize,
    pub incorrect: usize,
}

pub fn streaks<I>(outcomes: I) -> Streaks
where
    I: IntoIterator<Item = bool>,
{
    let mut run_correct = 0;
    let mut run_incorrect = 0;
    let mut max = Streaks::default();

    for correct in outcomes {
        if correct {
            run_correct += 1;
            run_incorrect = 0;
            max.correct = max.correct.max(run_correct);
        } else {
            run_incorrect += 1;
            run_correct = 0;
            max.incorrect = max.incorrect.max(run_incorrect);
        }
    }
    max
}

/// Attempt count to confidence: 1 → 5, 2 → 4, 3 → 3, 4+ → 2.
/// A question never answered counts as one attempt.
pub fn confidence_level(attempts: u32) -> i32 {
    match attempts {
        0 | 1 => 5,
        2 => 4,
        3 => 3,
        _ => 2,
    }
}

/// Mean confidence, 3 when there is nothing to average.
pub fn confidence_score(levels: &[i32]) -> f64 {
    if levels.is_empty() {
        return 3.0;
    }
    round2(levels.iter().sum::<i32>() as f64 / levels.len() as f64)
}

/// Classifies a question by its time relative to the session average.
/// A question without a recorded time is `Medium`.
pub fn question_difficulty(time_spent: Option<u64>, average: f64) -> Difficulty {
    match time_spent {
        Some(t) if t as f64 > average * 1.5 => Difficulty::Hard,
        Some(t) if (t as f64) < average * 0.5 => Difficulty::Easy,
        _ => Difficulty::Medium,
    }
}

pub fn overall_difficulty(score: i32) -> Difficulty {
    if score >= 80 {
        Difficulty::Easy
    } else if score >= 60 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

pub fn mastery_level(score: i32) -> MasteryLevel {
    if score >= 80 {
        MasteryLevel::Mastered
    } else if score >= 60 {
        MasteryLevel::Proficient
    } else {
        MasteryLevel::Developing
    }
}

/// Average seconds per question.
///
/// Unrecorded slots count as zero. When nothing was recorded at all the whole
/// session time is spread over the questions instead.
pub fn average_time_per_question(times: &[Option<u64>], total_time_spent: u64) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    let average = if times.iter().any(Option::is_some) {
        times.iter().map(|t| t.unwrap_or(0)).sum::<u64>() as f64 / times.len() as f64
    } else {
        total_time_spent as f64 / times.len() as f64
    };
    round2(average)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
