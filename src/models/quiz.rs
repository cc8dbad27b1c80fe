// src/models/quiz.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::PublicQuestion;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub language_id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Flat bonus credited when an attempt passes.
    pub points: i64,

    /// Minimum percentage of question points needed to pass.
    pub passing_score: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Quiz with its questions and answer choices.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}

/// Represents the 'quiz_attempts' table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,

    /// Sum of the points of correctly answered questions.
    pub score: i64,

    /// Question point total the pass decision was measured against.
    pub total_points: i64,

    /// Bonus actually credited to the user for this attempt.
    pub points_earned: i64,

    pub passed: bool,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(skip)]
    #[serde(default)]
    pub answers: Vec<QuizAttemptAnswer>,
}

/// Represents the 'quiz_attempt_answers' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttemptAnswer {
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// Key: Question ID, Value: chosen Answer ID.
    #[validate(length(min = 1, message = "No answers submitted"))]
    pub answers: HashMap<i64, i64>,

    /// When the client started the attempt.
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Response for a quiz submission.
#[derive(Debug, Serialize)]
pub struct QuizSubmissionResult {
    pub attempt: QuizAttempt,
    pub score: i64,
    pub total_points: i64,
    pub passed: bool,
    pub points_earned: i64,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(range(min = 1))]
    pub language_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub points: i64,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: i64,
}
