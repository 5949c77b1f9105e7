// src/quiz/builder.rs

use chrono::{DateTime, Utc};

use crate::{
    models::{
        quiz::Chapter,
        submission::{
            LearningObjectiveMastery, NewSubmission, QuestionAnalytics, QuestionResult,
            SubmissionAnalytics,
        },
    },
    quiz::analytics,
};

/// Everything recorded during a run, borrowed from the session.
///
/// All per-question slices are indexed like `chapter.quiz_questions`.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionInput<'a> {
    pub subject: &'a str,
    pub chapter: &'a Chapter,
    pub answers: &'a [Option<String>],
    pub first_answers: &'a [Option<String>],
    pub attempts: &'a [u32],
    pub times: &'a [Option<u64>],
    pub hints_used: u32,
    pub review_count: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SubmissionInput<'_> {
    fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }

    fn first_answer(&self, index: usize) -> Option<&str> {
        self.first_answers.get(index).and_then(|a| a.as_deref())
    }

    fn time(&self, index: usize) -> Option<u64> {
        self.times.get(index).copied().flatten()
    }

    fn attempts(&self, index: usize) -> u32 {
        self.attempts.get(index).copied().filter(|a| *a > 0).unwrap_or(1)
    }
}

/// Derives the persisted submission from a finished run.
///
/// Question text, options and explanations are copied, so the result never
/// changes if the source quiz is edited or removed later.
pub fn build_submission(input: &SubmissionInput<'_>) -> NewSubmission {
    let questions = &input.chapter.quiz_questions;
    let total = questions.len();

    let outcomes: Vec<bool> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| analytics::is_correct(q, input.answer(i)))
        .collect();
    let first_outcomes: Vec<bool> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| analytics::is_correct(q, input.first_answer(i)))
        .collect();

    let correct = outcomes.iter().filter(|c| **c).count();
    let score = analytics::score_percentage(correct, total);
    let streaks = analytics::streaks(outcomes.iter().copied());

    let total_time_spent = (input.finished_at - input.started_at).num_seconds().max(0) as u64;
    let slots: Vec<Option<u64>> = (0..total).map(|i| input.time(i)).collect();
    let average = analytics::average_time_per_question(&slots, total_time_spent);

    let submission_data: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionResult {
            question: q.question.clone(),
            correct_answer: q.correct_answer.clone(),
            user_answer: input.answer(i).unwrap_or_default().to_string(),
            is_correct: outcomes[i],
            explanation: q.explanation.clone(),
            options: q.options.clone(),
        })
        .collect();

    let question_analytics: Vec<QuestionAnalytics> = (0..total)
        .map(|i| {
            let attempts = input.attempts(i);
            QuestionAnalytics {
                question_index: i as i32 + 1,
                time_spent: slots[i].unwrap_or(0) as i32,
                attempts: attempts as i32,
                is_correct: outcomes[i],
                is_first_attempt_correct: first_outcomes[i],
                difficulty: analytics::question_difficulty(slots[i], average),
                confidence_level: analytics::confidence_level(attempts),
            }
        })
        .collect();

    let confidence_levels: Vec<i32> = question_analytics.iter().map(|q| q.confidence_level).collect();
    let concepts_struggled = question_analytics
        .iter()
        .filter(|q| !q.is_correct)
        .map(|q| q.question_index)
        .collect();

    NewSubmission {
        quiz_title: format!("{} - {}", input.subject, input.chapter.chapter_name),
        subject: input.subject.to_string(),
        chapter: input.chapter.chapter_name.clone(),
        total_questions: total as i32,
        correct_answers: correct as i32,
        score,
        submission_data,
        analytics: SubmissionAnalytics {
            total_time_spent: total_time_spent as i32,
            average_time_per_question: average,
            difficulty_level: analytics::overall_difficulty(score),
            completion_percentage: 100.0,
            streak_correct: streaks.correct as i32,
            streak_incorrect: streaks.incorrect as i32,
            first_attempt_correct: first_outcomes.iter().filter(|c| **c).count() as i32,
            questions_skipped: 0,
            hints_used: input.hints_used as i32,
            review_count: input.review_count as i32,
            confidence_score: analytics::confidence_score(&confidence_levels),
            learning_objective_mastery: LearningObjectiveMastery {
                subject: input.subject.to_string(),
                chapter: input.chapter.chapter_name.clone(),
                mastery_level: analytics::mastery_level(score),
                concepts_struggled,
            },
            question_analytics,
        },
    }
}
