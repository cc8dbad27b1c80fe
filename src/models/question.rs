// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
///
/// A question belongs either to a lesson, where it is answered with free text
/// compared against `correct_answer`, or to a quiz, where it is answered by
/// picking one of its `answers` rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub lesson_id: Option<i64>,
    pub quiz_id: Option<i64>,

    /// The text content of the question.
    pub question_text: String,

    /// Question type, e.g. 'single' or 'text'.
    pub question_type: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Expected answer for lesson questions. Compared verbatim.
    pub correct_answer: Option<String>,

    /// Explanation shown after answering.
    pub explanation: Option<String>,

    pub points: i64,
    pub difficulty: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'answers' table: one selectable choice of a quiz question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
}

/// DTO for an answer choice sent to clients (correctness hidden).
#[derive(Debug, Clone, Serialize)]
pub struct PublicAnswer {
    pub id: i64,
    pub answer_text: String,
}

impl From<Answer> for PublicAnswer {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id,
            answer_text: a.answer_text,
        }
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question_text: String,
    pub options: Json<Vec<String>>,
    pub points: i64,

    /// Whether the caller already answered this question correctly.
    pub is_completed: bool,

    /// Choices for quiz questions; empty for lesson questions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<PublicAnswer>,
}

impl PublicQuestion {
    pub fn from_question(q: Question, is_completed: bool) -> Self {
        Self {
            id: q.id,
            question_type: q.question_type,
            question_text: q.question_text,
            options: q.options,
            points: q.points,
            is_completed,
            answers: Vec::new(),
        }
    }
}

/// DTO for answering a lesson question.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 5000, message = "Answer must not be empty"))]
    pub answer: String,
}

/// DTO for an answer choice when creating a quiz question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub lesson_id: Option<i64>,
    pub quiz_id: Option<i64>,
    #[validate(length(min = 1, max = 20))]
    pub question_type: String,
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: Option<String>,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub points: i64,
    #[serde(default = "default_difficulty")]
    #[validate(range(min = 1, max = 5))]
    pub difficulty: i64,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<CreateAnswerRequest>,
}

fn default_difficulty() -> i64 {
    1
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("invalid_option_length"));
        }
    }
    Ok(())
}
