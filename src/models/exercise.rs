// src/models/exercise.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Represents the 'exercises' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub starter_code: Option<String>,

    /// Reference solution. Never sent to clients.
    #[serde(skip_serializing)]
    pub solution_code: Option<String>,

    /// Structured test case data consumed by test runners.
    pub test_cases: Json<serde_json::Value>,

    pub points: i64,

    /// Difficulty tag: 'beginner', 'intermediate' or 'advanced'.
    pub difficulty: String,

    pub is_active: bool,
    pub position: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending an exercise to clients, with the caller's completion flag.
#[derive(Debug, Serialize)]
pub struct PublicExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub is_completed: bool,
}

/// Outcome of one exercise submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Passed,
    Failed,
}

/// Represents the 'exercise_submissions' table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExerciseSubmission {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub code: String,
    pub status: SubmissionStatus,
    pub test_results: Json<serde_json::Value>,
    pub points_earned: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting code to an exercise.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    #[validate(length(min = 1, max = 100000, message = "Code must not be empty"))]
    pub code: String,
}

/// DTO for creating a new exercise.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(range(min = 1))]
    pub lesson_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub instructions: Option<String>,
    #[validate(length(max = 100000))]
    pub starter_code: Option<String>,
    #[validate(length(max = 100000))]
    pub solution_code: Option<String>,
    #[serde(default = "empty_test_cases")]
    pub test_cases: serde_json::Value,
    #[validate(range(min = 0, max = 10000))]
    pub points: i64,
    #[serde(default = "default_difficulty")]
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: String,
    #[serde(default)]
    pub position: i64,
}

fn empty_test_cases() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "beginner" | "intermediate" | "advanced" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}
