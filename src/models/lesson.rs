// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{
    exercise::PublicExercise, language::validate_slug, progress::ProgressRecord,
    question::PublicQuestion,
};

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub language_id: i64,
    pub slug: String,
    pub title: String,

    /// Sanitized HTML body.
    pub content: String,

    /// Ordering inside the language.
    pub position: i64,

    /// Points awarded when the lesson is marked complete.
    pub points: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Short reference used for previous/next navigation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonLink {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct LessonNavigation {
    pub previous: Option<LessonLink>,
    pub next: Option<LessonLink>,
}

/// A lesson in a language listing, with the caller's progress.
#[derive(Debug, Serialize)]
pub struct LessonSummary {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub user_progress: Option<ProgressRecord>,
}

/// Full lesson view.
#[derive(Debug, Serialize)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub questions: Vec<PublicQuestion>,
    pub exercises: Vec<PublicExercise>,
    pub user_progress: Option<ProgressRecord>,
    pub navigation: LessonNavigation,
}

/// DTO for creating a lesson.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(range(min = 1))]
    pub language_id: i64,
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 100000))]
    pub content: String,
    #[serde(default)]
    pub position: i64,
    #[validate(range(min = 0, max = 10000))]
    pub points: i64,
}
