// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One subject with its chapters. This is the unit a quiz document is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub subject: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub chapter_name: String,
    pub quiz_questions: Vec<Question>,
}

/// A single-choice question.
///
/// Text fields may carry math markup; it is stored and returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    /// Ordered options. Duplicates are tolerated.
    pub options: Vec<String>,
    /// Expected to equal exactly one entry of `options`.
    pub correct_answer: String,
    pub explanation: String,
}

/// Quiz content as it arrives over the wire: either a single subject object
/// or an array of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizData {
    Multiple(Vec<Quiz>),
    Single(Quiz),
}

impl QuizData {
    /// Normalizes to the sequence form. Attempt snapshots are always stored this way.
    pub fn into_subjects(self) -> Vec<Quiz> {
        match self {
            QuizData::Multiple(subjects) => subjects,
            QuizData::Single(subject) => vec![subject],
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("quiz content contains no subjects")]
pub struct EmptyQuiz;

/// Normalized quiz content: a non-empty ordered sequence of subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSet(Vec<Quiz>);

impl QuizSet {
    pub fn new(subjects: Vec<Quiz>) -> Result<Self, EmptyQuiz> {
        if subjects.is_empty() {
            return Err(EmptyQuiz);
        }
        Ok(Self(subjects))
    }

    pub fn subjects(&self) -> &[Quiz] {
        &self.0
    }

    pub fn first(&self) -> &Quiz {
        // Non-empty by construction.
        &self.0[0]
    }
}

impl TryFrom<QuizData> for QuizSet {
    type Error = EmptyQuiz;

    fn try_from(data: QuizData) -> Result<Self, Self::Error> {
        QuizSet::new(data.into_subjects())
    }
}

/// A single shape problem found in submitted quiz content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Checks that `value` has the shape of [`QuizData`] and parses it.
///
/// Every mismatch is reported with its JSON path, so callers get the full
/// list instead of the first failure.
pub fn parse_quiz_data(value: Value) -> Result<QuizData, Vec<SchemaIssue>> {
    let mut issues = Vec::new();

    match &value {
        Value::Array(subjects) => {
            if subjects.is_empty() {
                issues.push(SchemaIssue::new("quizData", "expected at least one subject"));
            }
            for (i, subject) in subjects.iter().enumerate() {
                check_subject(subject, &format!("quizData[{}]", i), &mut issues);
            }
        }
        Value::Object(_) => check_subject(&value, "quizData", &mut issues),
        _ => issues.push(SchemaIssue::new(
            "quizData",
            "expected a subject object or an array of subject objects",
        )),
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    serde_json::from_value(value).map_err(|e| vec![SchemaIssue::new("quizData", e.to_string())])
}

fn check_subject(value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(obj) = value.as_object() else {
        issues.push(SchemaIssue::new(path, "expected object"));
        return;
    };
    check_string(obj.get("subject"), &format!("{}.subject", path), issues);

    let chapters_path = format!("{}.chapters", path);
    if let Some(chapters) = check_array(obj.get("chapters"), &chapters_path, issues) {
        for (i, chapter) in chapters.iter().enumerate() {
            check_chapter(chapter, &format!("{}[{}]", chapters_path, i), issues);
        }
    }
}

fn check_chapter(value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(obj) = value.as_object() else {
        issues.push(SchemaIssue::new(path, "expected object"));
        return;
    };
    check_string(obj.get("chapterName"), &format!("{}.chapterName", path), issues);

    let questions_path = format!("{}.quizQuestions", path);
    if let Some(questions) = check_array(obj.get("quizQuestions"), &questions_path, issues) {
        for (i, question) in questions.iter().enumerate() {
            check_question(question, &format!("{}[{}]", questions_path, i), issues);
        }
    }
}

fn check_question(value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(obj) = value.as_object() else {
        issues.push(SchemaIssue::new(path, "expected object"));
        return;
    };
    for field in ["question", "correctAnswer", "explanation"] {
        check_string(obj.get(field), &format!("{}.{}", path, field), issues);
    }

    let options_path = format!("{}.options", path);
    if let Some(options) = check_array(obj.get("options"), &options_path, issues) {
        for (i, option) in options.iter().enumerate() {
            if !option.is_string() {
                issues.push(SchemaIssue::new(
                    &format!("{}[{}]", options_path, i),
                    "expected string",
                ));
            }
        }
    }
}

fn check_string(value: Option<&Value>, path: &str, issues: &mut Vec<SchemaIssue>) {
    match value {
        Some(Value::String(_)) => {}
        None => issues.push(SchemaIssue::new(path, "required")),
        Some(_) => issues.push(SchemaIssue::new(path, "expected string")),
    }
}

fn check_array<'a>(
    value: Option<&'a Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<&'a Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Some(items),
        None => {
            issues.push(SchemaIssue::new(path, "required"));
            None
        }
        Some(_) => {
            issues.push(SchemaIssue::new(path, "expected array"));
            None
        }
    }
}
