// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    extractors::AppJson,
    db::{self, content},
    error::AppError,
    models::{
        exercise::CreateExerciseRequest,
        language::CreateLanguageRequest,
        lesson::CreateLessonRequest,
        progress::TrackedEntity,
        question::CreateQuestionRequest,
        quiz::CreateQuizRequest,
    },
    utils::html::clean_html,
};

/// Maps constraint violations on admin inserts to client errors.
fn write_error(e: sqlx::Error, what: &str) -> AppError {
    match e.as_database_error() {
        Some(d) if d.is_unique_violation() => AppError::Conflict(format!("{} already exists", what)),
        Some(d) if d.is_foreign_key_violation() => {
            AppError::NotFound(format!("Parent of {} not found", what.to_lowercase()))
        }
        _ => {
            tracing::error!("Failed to create {}: {:?}", what.to_lowercase(), e);
            AppError::from(e)
        }
    }
}

/// Creates a language.
/// Admin only.
pub async fn create_language(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<CreateLanguageRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let language = content::insert_language(&pool, &payload)
        .await
        .map_err(|e| write_error(e, "Language"))?;

    Ok((StatusCode::CREATED, Json(language)))
}

/// Creates a lesson. The HTML body is sanitized before it is stored.
/// Admin only.
pub async fn create_lesson(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sanitized = clean_html(&payload.content);
    let lesson = content::insert_lesson(&pool, &payload, &sanitized)
        .await
        .map_err(|e| write_error(e, "Lesson"))?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Checks the shape rules a question must meet beyond per-field validation.
fn check_question_shape(payload: &CreateQuestionRequest) -> Result<TrackedEntity, AppError> {
    match (payload.lesson_id, payload.quiz_id) {
        (Some(lesson_id), None) => {
            if payload.correct_answer.is_none() {
                return Err(AppError::Unprocessable(
                    "Lesson questions need a correct_answer".to_string(),
                ));
            }
            Ok(TrackedEntity::Lesson(lesson_id))
        }
        (None, Some(quiz_id)) => {
            if !payload.answers.iter().any(|a| a.is_correct) {
                return Err(AppError::Unprocessable(
                    "Quiz questions need at least one correct answer".to_string(),
                ));
            }
            Ok(TrackedEntity::Quiz(quiz_id))
        }
        _ => Err(AppError::Unprocessable(
            "Exactly one of lesson_id or quiz_id must be set".to_string(),
        )),
    }
}

/// Creates a lesson or quiz question together with its answer choices.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let parent = check_question_shape(&payload)?;

    let mut tx = db::begin_write(&pool).await?;
    content::entity_points(&mut *tx, parent)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", parent)))?;
    let question = content::insert_question(&mut tx, &payload)
        .await
        .map_err(|e| write_error(e, "Question"))?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Creates an exercise.
/// Admin only.
pub async fn create_exercise(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exercise = content::insert_exercise(&pool, &payload)
        .await
        .map_err(|e| write_error(e, "Exercise"))?;

    Ok((StatusCode::CREATED, Json(exercise)))
}

/// Creates a quiz.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = content::insert_quiz(&pool, &payload)
        .await
        .map_err(|e| write_error(e, "Quiz"))?;

    Ok((StatusCode::CREATED, Json(quiz)))
}
