// src/services/submission.rs

//! Submission handlers of the progress & scoring engine.
//!
//! Every operation takes the acting user's id explicitly. Writes that award
//! points run in one transaction together with the progress update, so a
//! failure leaves neither behind. Those transactions take SQLite's write
//! lock up front (`db::begin_write`).

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool, types::Json};
use validator::Validate;

use crate::{
    db::{
        self, content,
        progress::{self, ProgressPatch, ProgressUpsert},
        submissions::{self, NewQuizAttempt},
        users,
    },
    error::AppError,
    models::{
        exercise::{SubmissionStatus, SubmitCodeRequest},
        lesson::Lesson,
        progress::{ProgressRecord, ProgressStatus, TrackedEntity},
        question::SubmitAnswerRequest,
        quiz::{QuizAttemptAnswer, QuizSubmissionResult, SubmitQuizRequest},
    },
    scoring::{self, QuizQuestionKey, runner::TestRunner, validator::ValidatorRegistry},
};

/// Outcome reported for a lesson question answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Completed,
    Incorrect,
    AlreadyCompleted,
}

#[derive(Debug, Serialize)]
pub struct QuestionVerdict {
    pub is_correct: bool,
    pub message: String,
    /// Points credited by this submission.
    pub points: i64,
    pub status: AnswerStatus,
}

#[derive(Debug, Serialize)]
pub struct ExerciseVerdict {
    pub is_correct: bool,
    pub message: String,
    /// Points credited by this submission.
    pub points: i64,
    pub status: ProgressStatus,
}

#[derive(Debug, Serialize)]
pub struct ExerciseRunResult {
    pub id: i64,
    pub status: SubmissionStatus,
    pub test_results: Json<serde_json::Value>,
    pub points_earned: i64,
}

/// Result of completing an entity inside a transaction.
struct Award {
    record: ProgressRecord,
    newly_completed: bool,
    points_awarded: i64,
}

/// Maps a progress write that failed because the user row is gone.
fn user_write_error(e: sqlx::Error) -> AppError {
    match e.as_database_error() {
        Some(d) if d.is_foreign_key_violation() => {
            AppError::AuthError("User no longer exists".to_string())
        }
        _ => AppError::from(e),
    }
}

/// `upsert_progress` with the user's foreign key surfaced as a 401.
async fn upsert(
    conn: &mut SqliteConnection,
    user_id: i64,
    entity: TrackedEntity,
    patch: ProgressPatch,
) -> Result<ProgressUpsert, AppError> {
    progress::upsert_progress(conn, user_id, entity, patch)
        .await
        .map_err(user_write_error)
}

/// Completes `entity` for the user and credits `points` if this call is the
/// one that completed it.
async fn award_completion(
    conn: &mut SqliteConnection,
    user_id: i64,
    entity: TrackedEntity,
    points: i64,
) -> Result<Award, AppError> {
    let completed = upsert(conn, user_id, entity, ProgressPatch::Complete { score: points }).await?;

    if !completed.newly_completed {
        return Ok(Award {
            record: completed.record,
            newly_completed: false,
            points_awarded: 0,
        });
    }

    let total = users::add_points(conn, user_id, points).await.map_err(|e| match e {
        sqlx::Error::RowNotFound => AppError::AuthError("User no longer exists".to_string()),
        other => AppError::from(other),
    })?;
    tracing::info!(
        "User {} completed {} (+{} points, total {})",
        user_id,
        entity,
        points,
        total
    );

    Ok(Award {
        record: completed.record,
        newly_completed: true,
        points_awarded: points,
    })
}

/// Answers a lesson question.
///
/// A question the user already completed short-circuits to
/// `already_completed` without re-scoring. Incorrect answers write nothing.
pub async fn answer_question(
    pool: &SqlitePool,
    user_id: i64,
    lesson_id: i64,
    question_id: i64,
    req: &SubmitAnswerRequest,
) -> Result<QuestionVerdict, AppError> {
    req.validate()?;

    let question = content::find_question(pool, question_id)
        .await?
        .filter(|q| q.lesson_id == Some(lesson_id))
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let entity = TrackedEntity::Question(question.id);

    let existing = progress::get_progress(pool, user_id, entity).await?;
    if existing.is_some_and(|p| p.is_completed()) {
        return Ok(already_completed());
    }

    if !scoring::answer_is_correct(&req.answer, question.correct_answer.as_deref()) {
        return Ok(QuestionVerdict {
            is_correct: false,
            message: "Incorrect. Please review the material and try again.".to_string(),
            points: 0,
            status: AnswerStatus::Incorrect,
        });
    }

    let mut tx = db::begin_write(pool).await?;
    let award = award_completion(&mut tx, user_id, entity, question.points).await?;
    upsert(&mut tx, user_id, TrackedEntity::Lesson(lesson_id), ProgressPatch::Start).await?;
    tx.commit().await?;

    // Lost a race with a concurrent correct submission.
    if !award.newly_completed {
        return Ok(already_completed());
    }

    Ok(QuestionVerdict {
        is_correct: true,
        message: "Correct! Well done.".to_string(),
        points: award.points_awarded,
        status: AnswerStatus::Completed,
    })
}

fn already_completed() -> QuestionVerdict {
    QuestionVerdict {
        is_correct: true,
        message: "This question has already been submitted and completed successfully.".to_string(),
        points: 0,
        status: AnswerStatus::AlreadyCompleted,
    }
}

/// Submits code for a lesson exercise, checked by the validator registry.
///
/// Failed submissions still record the attempt as `in_progress`.
pub async fn submit_lesson_exercise(
    pool: &SqlitePool,
    validators: &ValidatorRegistry,
    user_id: i64,
    lesson_id: i64,
    exercise_id: i64,
    req: &SubmitCodeRequest,
) -> Result<ExerciseVerdict, AppError> {
    req.validate()?;

    let exercise = content::find_exercise(pool, exercise_id)
        .await?
        .filter(|e| e.lesson_id == lesson_id && e.is_active)
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    let passed = validators.validate(&req.code, &exercise).await;
    let entity = TrackedEntity::Exercise(exercise.id);

    let mut tx = db::begin_write(pool).await?;
    let (record, newly_completed, points) = if passed {
        let award = award_completion(&mut tx, user_id, entity, exercise.points).await?;
        (award.record, award.newly_completed, award.points_awarded)
    } else {
        let started = upsert(&mut tx, user_id, entity, ProgressPatch::Start).await?;
        (started.record, false, 0)
    };
    tx.commit().await?;

    let message = match (passed, newly_completed) {
        (true, true) => "Exercise completed successfully!",
        (true, false) => "Exercise already completed.",
        (false, _) => "Your solution did not pass. Check the instructions and try again.",
    };

    Ok(ExerciseVerdict {
        is_correct: passed,
        message: message.to_string(),
        points,
        status: record.status,
    })
}

/// Runs an exercise's test cases and appends an exercise submission.
pub async fn run_exercise(
    pool: &SqlitePool,
    runner: &dyn TestRunner,
    user_id: i64,
    exercise_id: i64,
    req: &SubmitCodeRequest,
) -> Result<ExerciseRunResult, AppError> {
    req.validate()?;

    let exercise = content::find_exercise(pool, exercise_id)
        .await?
        .filter(|e| e.is_active)
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    let report = runner.run(&req.code, &exercise).await;
    let entity = TrackedEntity::Exercise(exercise.id);
    let status = if report.passed {
        SubmissionStatus::Passed
    } else {
        SubmissionStatus::Failed
    };
    let test_results = serde_json::to_value(&report.results)?;

    let mut tx = db::begin_write(pool).await?;
    let points_earned = if report.passed {
        award_completion(&mut tx, user_id, entity, exercise.points)
            .await?
            .points_awarded
    } else {
        upsert(&mut tx, user_id, entity, ProgressPatch::Start).await?;
        0
    };
    let submission = submissions::insert_exercise_submission(
        &mut *tx,
        user_id,
        exercise.id,
        &req.code,
        status,
        &test_results,
        points_earned,
    )
    .await?;
    tx.commit().await?;

    Ok(ExerciseRunResult {
        id: submission.id,
        status: submission.status,
        test_results: submission.test_results,
        points_earned: submission.points_earned,
    })
}

/// Marks a lesson complete. Idempotent: points are credited once.
pub async fn complete_lesson(
    pool: &SqlitePool,
    user_id: i64,
    lesson: &Lesson,
) -> Result<ProgressRecord, AppError> {
    let mut tx = db::begin_write(pool).await?;
    let award =
        award_completion(&mut tx, user_id, TrackedEntity::Lesson(lesson.id), lesson.points).await?;
    tx.commit().await?;
    Ok(award.record)
}

/// Grades and records a quiz attempt.
///
/// Attempts are append-only. The quiz bonus is credited on the first passing
/// attempt only; later passing attempts record `points_earned = 0`.
pub async fn submit_quiz(
    pool: &SqlitePool,
    user_id: i64,
    language_slug: &str,
    quiz_id: i64,
    req: &SubmitQuizRequest,
) -> Result<QuizSubmissionResult, AppError> {
    req.validate()?;

    let quiz = content::find_quiz_in_language(pool, language_slug, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let questions = content::quiz_questions(pool, quiz.id).await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();

    let mut submitted: Vec<i64> = req.answers.keys().copied().collect();
    submitted.sort_unstable();
    if let Some(foreign) = submitted.iter().find(|id| !question_ids.contains(*id)) {
        return Err(AppError::Unprocessable(format!(
            "Question {} does not belong to this quiz",
            foreign
        )));
    }

    let answers = content::answers_for_questions(pool, &question_ids).await?;
    let keys: Vec<QuizQuestionKey> = questions
        .iter()
        .map(|q| QuizQuestionKey {
            question_id: q.id,
            points: q.points,
            correct_answer_ids: answers
                .iter()
                .filter(|a| a.question_id == q.id && a.is_correct)
                .map(|a| a.id)
                .collect(),
        })
        .collect();

    let outcome = scoring::score_quiz(&keys, &req.answers, quiz.passing_score, quiz.points);
    let entity = TrackedEntity::Quiz(quiz.id);

    let mut tx = db::begin_write(pool).await?;
    let points_earned = if outcome.passed {
        award_completion(&mut tx, user_id, entity, outcome.bonus)
            .await?
            .points_awarded
    } else {
        upsert(&mut tx, user_id, entity, ProgressPatch::Start).await?;
        0
    };

    let graded: Vec<QuizAttemptAnswer> = outcome
        .answers
        .iter()
        .map(|a| QuizAttemptAnswer {
            question_id: a.question_id,
            answer_id: a.answer_id,
            is_correct: a.is_correct,
        })
        .collect();

    let attempt = submissions::insert_quiz_attempt(
        &mut tx,
        NewQuizAttempt {
            user_id,
            quiz_id: quiz.id,
            score: outcome.score,
            total_points: outcome.total_points,
            points_earned,
            passed: outcome.passed,
            started_at: req.started_at,
            answers: &graded,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        "User {} attempted quiz {}: {}/{} ({:.1}%), passed={}",
        user_id,
        quiz.id,
        outcome.score,
        outcome.total_points,
        scoring::percentage(outcome.score, outcome.total_points),
        outcome.passed
    );

    Ok(QuizSubmissionResult {
        attempt,
        score: outcome.score,
        total_points: outcome.total_points,
        passed: outcome.passed,
        points_earned,
    })
}
