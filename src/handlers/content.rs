// src/handlers/content.rs

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    db::{
        content,
        progress::{self, ProgressPatch},
    },
    error::AppError,
    models::{
        exercise::PublicExercise,
        language::Language,
        lesson::{LessonDetail, LessonNavigation, LessonSummary},
        progress::{EntityKind, TrackedEntity},
        question::{PublicAnswer, PublicQuestion},
        quiz::{Quiz, QuizDetail},
    },
    utils::jwt::Claims,
};

async fn language_or_404(pool: &SqlitePool, slug: &str) -> Result<Language, AppError> {
    content::find_language(pool, slug)
        .await?
        .ok_or(AppError::NotFound("Language not found".to_string()))
}

/// Ids among `ids` the user has completed.
async fn completed_ids(
    pool: &SqlitePool,
    user_id: i64,
    kind: EntityKind,
    ids: &[i64],
) -> Result<HashSet<i64>, AppError> {
    let records = progress::progress_for_entities(pool, user_id, kind, ids).await?;
    Ok(records
        .into_iter()
        .filter(|p| p.is_completed())
        .map(|p| p.entity_id)
        .collect())
}

pub async fn list_languages(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(content::list_languages(&pool).await?))
}

/// Lists a language's lessons in order, each with the caller's progress.
pub async fn list_lessons(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let language = language_or_404(&pool, &slug).await?;

    let lessons = content::list_lessons(&pool, language.id).await?;
    let ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    let mut records = progress::progress_for_entities(&pool, user_id, EntityKind::Lesson, &ids).await?;

    let summaries: Vec<LessonSummary> = lessons
        .into_iter()
        .map(|lesson| {
            let user_progress = records
                .iter()
                .position(|p| p.entity_id == lesson.id)
                .map(|i| records.swap_remove(i));
            LessonSummary {
                lesson,
                user_progress,
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// Lesson view: questions and active exercises with completion flags, the
/// caller's lesson progress and previous/next navigation.
///
/// Viewing refreshes `last_accessed_at` of an existing lesson record; it never
/// creates one.
pub async fn get_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((slug, lesson_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let lesson = content::find_lesson_by_slug(&pool, &slug, &lesson_slug)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    let questions = content::lesson_questions(&pool, lesson.id).await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let done_questions = completed_ids(&pool, user_id, EntityKind::Question, &question_ids).await?;

    let exercises = content::lesson_exercises(&pool, lesson.id).await?;
    let exercise_ids: Vec<i64> = exercises.iter().map(|e| e.id).collect();
    let done_exercises = completed_ids(&pool, user_id, EntityKind::Exercise, &exercise_ids).await?;

    let mut conn = pool.acquire().await?;
    let entity = TrackedEntity::Lesson(lesson.id);
    let user_progress = match progress::get_progress(&mut *conn, user_id, entity).await? {
        Some(_) => Some(
            progress::upsert_progress(&mut conn, user_id, entity, ProgressPatch::Touch)
                .await?
                .record,
        ),
        None => None,
    };
    let (previous, next) = content::lesson_neighbours(&mut conn, &lesson).await?;

    Ok(Json(LessonDetail {
        questions: questions
            .into_iter()
            .map(|q| {
                let done = done_questions.contains(&q.id);
                PublicQuestion::from_question(q, done)
            })
            .collect(),
        exercises: exercises
            .into_iter()
            .map(|e| PublicExercise {
                is_completed: done_exercises.contains(&e.id),
                exercise: e,
            })
            .collect(),
        lesson,
        user_progress,
        navigation: LessonNavigation { previous, next },
    }))
}

/// Quiz with its questions and answer choices. Correctness flags stay hidden.
async fn quiz_detail(pool: &SqlitePool, user_id: i64, quiz: Quiz) -> Result<QuizDetail, AppError> {
    let questions = content::quiz_questions(pool, quiz.id).await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let answers = content::answers_for_questions(pool, &question_ids).await?;
    let done = completed_ids(pool, user_id, EntityKind::Question, &question_ids).await?;

    let questions = questions
        .into_iter()
        .map(|q| {
            let choices: Vec<PublicAnswer> = answers
                .iter()
                .filter(|a| a.question_id == q.id)
                .cloned()
                .map(PublicAnswer::from)
                .collect();
            let is_completed = done.contains(&q.id);
            PublicQuestion {
                answers: choices,
                ..PublicQuestion::from_question(q, is_completed)
            }
        })
        .collect();

    Ok(QuizDetail { quiz, questions })
}

/// A language's quizzes, each with its questions and answer choices.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let language = language_or_404(&pool, &slug).await?;

    let mut details = Vec::new();
    for quiz in content::list_quizzes(&pool, language.id).await? {
        details.push(quiz_detail(&pool, user_id, quiz).await?);
    }

    Ok(Json(details))
}

pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((slug, quiz_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quiz = content::find_quiz_in_language(&pool, &slug, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz_detail(&pool, user_id, quiz).await?))
}
