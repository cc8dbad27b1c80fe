// src/db/submissions.rs

use sqlx::{Executor, Sqlite, SqliteConnection, types::Json};

use crate::models::{
    exercise::{ExerciseSubmission, SubmissionStatus},
    quiz::{QuizAttempt, QuizAttemptAnswer},
};

/// Fields of a new quiz attempt.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt<'a> {
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_points: i64,
    pub points_earned: i64,
    pub passed: bool,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub answers: &'a [QuizAttemptAnswer],
}

/// Appends a quiz attempt with its per-question answers.
pub async fn insert_quiz_attempt(
    conn: &mut SqliteConnection,
    new: NewQuizAttempt<'_>,
) -> Result<QuizAttempt, sqlx::Error> {
    let mut attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        INSERT INTO quiz_attempts
            (user_id, quiz_id, score, total_points, points_earned, passed, started_at, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, quiz_id, score, total_points, points_earned, passed, started_at, completed_at
        "#,
    )
    .bind(new.user_id)
    .bind(new.quiz_id)
    .bind(new.score)
    .bind(new.total_points)
    .bind(new.points_earned)
    .bind(new.passed)
    .bind(new.started_at)
    .bind(chrono::Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    for answer in new.answers {
        sqlx::query(
            "INSERT INTO quiz_attempt_answers (attempt_id, question_id, answer_id, is_correct) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(attempt.id)
        .bind(answer.question_id)
        .bind(answer.answer_id)
        .bind(answer.is_correct)
        .execute(&mut *conn)
        .await?;
    }

    attempt.answers = new.answers.to_vec();
    Ok(attempt)
}

/// Appends one exercise submission.
pub async fn insert_exercise_submission<'e, E>(
    executor: E,
    user_id: i64,
    exercise_id: i64,
    code: &str,
    status: SubmissionStatus,
    test_results: &serde_json::Value,
    points_earned: i64,
) -> Result<ExerciseSubmission, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ExerciseSubmission>(
        r#"
        INSERT INTO exercise_submissions
            (user_id, exercise_id, code, status, test_results, points_earned, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, exercise_id, code, status, test_results, points_earned, created_at
        "#,
    )
    .bind(user_id)
    .bind(exercise_id)
    .bind(code)
    .bind(status)
    .bind(Json(test_results))
    .bind(points_earned)
    .bind(chrono::Utc::now())
    .fetch_one(executor)
    .await
}

/// A user's submissions for one exercise, newest first.
pub async fn list_exercise_submissions<'e, E>(
    executor: E,
    user_id: i64,
    exercise_id: i64,
) -> Result<Vec<ExerciseSubmission>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ExerciseSubmission>(
        r#"
        SELECT id, user_id, exercise_id, code, status, test_results, points_earned, created_at
        FROM exercise_submissions
        WHERE user_id = $1 AND exercise_id = $2
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .bind(exercise_id)
    .fetch_all(executor)
    .await
}
