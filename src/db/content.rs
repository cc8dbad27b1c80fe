// src/db/content.rs

use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, types::Json};

use crate::models::{
    exercise::{CreateExerciseRequest, Exercise},
    language::{CreateLanguageRequest, Language},
    lesson::{CreateLessonRequest, Lesson, LessonLink},
    progress::TrackedEntity,
    question::{Answer, CreateQuestionRequest, Question},
    quiz::{CreateQuizRequest, Quiz},
};

const LESSON_COLUMNS: &str = "id, language_id, slug, title, content, position, points, created_at";
const QUESTION_COLUMNS: &str = "id, lesson_id, quiz_id, question_text, question_type, options, \
     correct_answer, explanation, points, difficulty, created_at";
const EXERCISE_COLUMNS: &str = "id, lesson_id, title, description, instructions, starter_code, \
     solution_code, test_cases, points, difficulty, is_active, position, created_at";
const QUIZ_COLUMNS: &str = "id, language_id, title, description, points, passing_score, created_at";

/// Point value of any trackable entity, or `None` when it does not exist.
///
/// This is the single place a `TrackedEntity` is resolved to its table.
pub async fn entity_points<'e, E>(executor: E, entity: TrackedEntity) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = match entity {
        TrackedEntity::Lesson(_) => "SELECT points FROM lessons WHERE id = $1",
        TrackedEntity::Question(_) => "SELECT points FROM questions WHERE id = $1",
        TrackedEntity::Exercise(_) => "SELECT points FROM exercises WHERE id = $1",
        TrackedEntity::Quiz(_) => "SELECT points FROM quizzes WHERE id = $1",
    };
    sqlx::query_scalar::<_, i64>(sql)
        .bind(entity.id())
        .fetch_optional(executor)
        .await
}

// ---- Languages ----

pub async fn list_languages<'e, E>(executor: E) -> Result<Vec<Language>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Language>(
        "SELECT id, slug, name, description, created_at FROM languages ORDER BY name",
    )
    .fetch_all(executor)
    .await
}

pub async fn find_language<'e, E>(executor: E, slug: &str) -> Result<Option<Language>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Language>(
        "SELECT id, slug, name, description, created_at FROM languages WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(executor)
    .await
}

pub async fn insert_language<'e, E>(executor: E, req: &CreateLanguageRequest) -> Result<Language, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Language>(
        r#"
        INSERT INTO languages (slug, name, description, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, slug, name, description, created_at
        "#,
    )
    .bind(&req.slug)
    .bind(&req.name)
    .bind(&req.description)
    .bind(chrono::Utc::now())
    .fetch_one(executor)
    .await
}

// ---- Lessons ----

pub async fn list_lessons<'e, E>(executor: E, language_id: i64) -> Result<Vec<Lesson>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE language_id = $1 ORDER BY position, id"
    );
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(language_id)
        .fetch_all(executor)
        .await
}

pub async fn find_lesson<'e, E>(executor: E, id: i64) -> Result<Option<Lesson>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1");
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Finds a lesson by language slug and lesson slug.
pub async fn find_lesson_by_slug<'e, E>(
    executor: E,
    language_slug: &str,
    lesson_slug: &str,
) -> Result<Option<Lesson>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Lesson>(
        r#"
        SELECT l.id, l.language_id, l.slug, l.title, l.content, l.position, l.points, l.created_at
        FROM lessons l
        JOIN languages lang ON lang.id = l.language_id
        WHERE lang.slug = $1 AND l.slug = $2
        "#,
    )
    .bind(language_slug)
    .bind(lesson_slug)
    .fetch_optional(executor)
    .await
}

/// Previous and next lessons of the same language, by (position, id).
pub async fn lesson_neighbours(
    conn: &mut SqliteConnection,
    lesson: &Lesson,
) -> Result<(Option<LessonLink>, Option<LessonLink>), sqlx::Error> {
    let previous = sqlx::query_as::<_, LessonLink>(
        r#"
        SELECT id, slug, title FROM lessons
        WHERE language_id = $1 AND (position < $2 OR (position = $2 AND id < $3))
        ORDER BY position DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(lesson.language_id)
    .bind(lesson.position)
    .bind(lesson.id)
    .fetch_optional(&mut *conn)
    .await?;

    let next = sqlx::query_as::<_, LessonLink>(
        r#"
        SELECT id, slug, title FROM lessons
        WHERE language_id = $1 AND (position > $2 OR (position = $2 AND id > $3))
        ORDER BY position ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(lesson.language_id)
    .bind(lesson.position)
    .bind(lesson.id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok((previous, next))
}

pub async fn insert_lesson<'e, E>(
    executor: E,
    req: &CreateLessonRequest,
    sanitized_content: &str,
) -> Result<Lesson, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO lessons (language_id, slug, title, content, position, points, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LESSON_COLUMNS}"
    );
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(req.language_id)
        .bind(&req.slug)
        .bind(&req.title)
        .bind(sanitized_content)
        .bind(req.position)
        .bind(req.points)
        .bind(chrono::Utc::now())
        .fetch_one(executor)
        .await
}

// ---- Questions & answers ----

pub async fn find_question<'e, E>(executor: E, id: i64) -> Result<Option<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
    sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn lesson_questions<'e, E>(executor: E, lesson_id: i64) -> Result<Vec<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE lesson_id = $1 ORDER BY id");
    sqlx::query_as::<_, Question>(&sql)
        .bind(lesson_id)
        .fetch_all(executor)
        .await
}

pub async fn quiz_questions<'e, E>(executor: E, quiz_id: i64) -> Result<Vec<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY id");
    sqlx::query_as::<_, Question>(&sql)
        .bind(quiz_id)
        .fetch_all(executor)
        .await
}

/// All answer rows of the given questions.
pub async fn answers_for_questions<'e, E>(
    executor: E,
    question_ids: &[i64],
) -> Result<Vec<Answer>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, question_id, answer_text, is_correct FROM answers WHERE question_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in question_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY question_id, id");

    query_builder.build_query_as::<Answer>().fetch_all(executor).await
}

/// Inserts a question and, for quiz questions, its answer rows.
pub async fn insert_question(
    conn: &mut SqliteConnection,
    req: &CreateQuestionRequest,
) -> Result<Question, sqlx::Error> {
    let sql = format!(
        "INSERT INTO questions \
         (lesson_id, quiz_id, question_text, question_type, options, correct_answer, explanation, points, difficulty, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {QUESTION_COLUMNS}"
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(req.lesson_id)
        .bind(req.quiz_id)
        .bind(&req.question_text)
        .bind(&req.question_type)
        .bind(Json(&req.options))
        .bind(&req.correct_answer)
        .bind(&req.explanation)
        .bind(req.points)
        .bind(req.difficulty)
        .bind(chrono::Utc::now())
        .fetch_one(&mut *conn)
        .await?;

    for answer in &req.answers {
        sqlx::query("INSERT INTO answers (question_id, answer_text, is_correct) VALUES ($1, $2, $3)")
            .bind(question.id)
            .bind(&answer.answer_text)
            .bind(answer.is_correct)
            .execute(&mut *conn)
            .await?;
    }

    Ok(question)
}

// ---- Exercises ----

pub async fn find_exercise<'e, E>(executor: E, id: i64) -> Result<Option<Exercise>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = $1");
    sqlx::query_as::<_, Exercise>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Active exercises of a lesson, in display order.
pub async fn lesson_exercises<'e, E>(executor: E, lesson_id: i64) -> Result<Vec<Exercise>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercises \
         WHERE lesson_id = $1 AND is_active = 1 ORDER BY position, id"
    );
    sqlx::query_as::<_, Exercise>(&sql)
        .bind(lesson_id)
        .fetch_all(executor)
        .await
}

pub async fn insert_exercise<'e, E>(executor: E, req: &CreateExerciseRequest) -> Result<Exercise, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO exercises \
         (lesson_id, title, description, instructions, starter_code, solution_code, test_cases, points, difficulty, position, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {EXERCISE_COLUMNS}"
    );
    sqlx::query_as::<_, Exercise>(&sql)
        .bind(req.lesson_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.instructions)
        .bind(&req.starter_code)
        .bind(&req.solution_code)
        .bind(Json(&req.test_cases))
        .bind(req.points)
        .bind(&req.difficulty)
        .bind(req.position)
        .bind(chrono::Utc::now())
        .fetch_one(executor)
        .await
}

// ---- Quizzes ----

pub async fn list_quizzes<'e, E>(executor: E, language_id: i64) -> Result<Vec<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE language_id = $1 ORDER BY id");
    sqlx::query_as::<_, Quiz>(&sql)
        .bind(language_id)
        .fetch_all(executor)
        .await
}

/// Finds a quiz only if it belongs to the language with `language_slug`.
pub async fn find_quiz_in_language<'e, E>(
    executor: E,
    language_slug: &str,
    quiz_id: i64,
) -> Result<Option<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT q.id, q.language_id, q.title, q.description, q.points, q.passing_score, q.created_at
        FROM quizzes q
        JOIN languages lang ON lang.id = q.language_id
        WHERE lang.slug = $1 AND q.id = $2
        "#,
    )
    .bind(language_slug)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_quiz<'e, E>(executor: E, req: &CreateQuizRequest) -> Result<Quiz, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO quizzes (language_id, title, description, points, passing_score, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {QUIZ_COLUMNS}"
    );
    sqlx::query_as::<_, Quiz>(&sql)
        .bind(req.language_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.points)
        .bind(req.passing_score)
        .bind(chrono::Utc::now())
        .fetch_one(executor)
        .await
}
