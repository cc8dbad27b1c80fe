// src/handlers/submission.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    extractors::AppJson,
    db::{content, submissions},
    error::AppError,
    models::{exercise::SubmitCodeRequest, question::SubmitAnswerRequest, quiz::SubmitQuizRequest},
    scoring::{runner::TestRunner, validator::ValidatorRegistry},
    services::submission,
    utils::jwt::Claims,
};

/// Answers a question of a lesson.
pub async fn answer_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((lesson_id, question_id)): Path<(i64, i64)>,
    AppJson(payload): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let verdict =
        submission::answer_question(&pool, claims.user_id()?, lesson_id, question_id, &payload).await?;
    Ok(Json(verdict))
}

/// Submits code for a lesson exercise.
pub async fn submit_lesson_exercise(
    State(pool): State<SqlitePool>,
    State(validators): State<Arc<ValidatorRegistry>>,
    Extension(claims): Extension<Claims>,
    Path((lesson_id, exercise_id)): Path<(i64, i64)>,
    AppJson(payload): AppJson<SubmitCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let verdict = submission::submit_lesson_exercise(
        &pool,
        &validators,
        claims.user_id()?,
        lesson_id,
        exercise_id,
        &payload,
    )
    .await?;
    Ok(Json(verdict))
}

/// Runs an exercise's test cases and records the submission.
pub async fn run_exercise(
    State(pool): State<SqlitePool>,
    State(runner): State<Arc<dyn TestRunner>>,
    Extension(claims): Extension<Claims>,
    Path(exercise_id): Path<i64>,
    AppJson(payload): AppJson<SubmitCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        submission::run_exercise(&pool, runner.as_ref(), claims.user_id()?, exercise_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// The caller's submission history for an exercise, newest first.
pub async fn list_exercise_submissions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(exercise_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    content::find_exercise(&pool, exercise_id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    let history = submissions::list_exercise_submissions(&pool, claims.user_id()?, exercise_id).await?;
    Ok(Json(history))
}

/// Marks a lesson complete, addressed by language and lesson slug.
pub async fn complete_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((slug, lesson_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = content::find_lesson_by_slug(&pool, &slug, &lesson_slug)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    let record = submission::complete_lesson(&pool, claims.user_id()?, &lesson).await?;
    Ok(Json(record))
}

/// Marks a lesson complete, addressed by id.
pub async fn complete_lesson_by_id(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = content::find_lesson(&pool, lesson_id)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    let record = submission::complete_lesson(&pool, claims.user_id()?, &lesson).await?;
    Ok(Json(record))
}

/// Grades a quiz attempt.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((slug, quiz_id)): Path<(String, i64)>,
    AppJson(payload): AppJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = submission::submit_quiz(&pool, claims.user_id()?, &slug, quiz_id, &payload).await?;
    Ok(Json(result))
}
