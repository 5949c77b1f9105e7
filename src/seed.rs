// src/seed.rs

use uuid::Uuid;

use crate::{
    models::{
        quiz::{Chapter, Question, Quiz, QuizData},
        quiz_record::NewQuiz,
        user::NewUser,
    },
    storage::{Storage, StorageError},
};

/// Owner of the sample quiz.
pub const SEED_USER_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440000);

/// Adds a small arithmetic quiz when the catalog is empty.
///
/// Returns whether anything was inserted.
pub async fn seed_sample_quiz(storage: &dyn Storage) -> Result<bool, StorageError> {
    if storage.quiz_count().await? > 0 {
        return Ok(false);
    }

    tracing::info!("Seeding sample quiz");
    let owner = storage
        .sync_user(NewUser {
            id: SEED_USER_ID,
            email: "test@example.com".to_string(),
            username: Some("testuser".to_string()),
        })
        .await?;

    let quiz = storage
        .create_quiz(NewQuiz {
            title: "Basic Math Quiz".to_string(),
            description: Some("A simple quiz to test basic arithmetic skills".to_string()),
            subject: "Mathematics".to_string(),
            quiz_data: QuizData::Single(sample_content()),
            created_by: owner.id,
        })
        .await?;

    tracing::info!(quiz_id = quiz.id, "Sample quiz created");
    Ok(true)
}

fn question(text: &str, options: [&str; 4], correct: &str, explanation: &str) -> Question {
    Question {
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
        explanation: explanation.to_string(),
    }
}

fn sample_content() -> Quiz {
    Quiz {
        subject: "Mathematics".to_string(),
        chapters: vec![Chapter {
            chapter_name: "Basic Arithmetic".to_string(),
            quiz_questions: vec![
                question("What is 2 + 2?", ["3", "4", "5", "6"], "4", "2 + 2 equals 4"),
                question("What is 5 × 3?", ["12", "15", "18", "20"], "15", "5 × 3 equals 15"),
            ],
        }],
    }
}
