// tests/common/mod.rs

#![allow(dead_code)]

use lingo_backend::{
    config::Config,
    db::{self, content, users},
    models::{
        exercise::CreateExerciseRequest,
        language::{CreateLanguageRequest, Language},
        lesson::{CreateLessonRequest, Lesson},
        question::{CreateAnswerRequest, CreateQuestionRequest},
        quiz::{CreateQuizRequest, Quiz},
    },
    routes,
    state::AppState,
    utils::hash::hash_password,
};
use sqlx::SqlitePool;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_username: None,
        admin_password: None,
    }
}

/// Fresh in-memory database with migrations applied.
/// A single connection keeps every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database")
}

/// A database file under the temp dir, removed on drop.
pub struct TempDb {
    pub pool: SqlitePool,
    path: std::path::PathBuf,
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// File-backed pool with several connections, for tests that need real
/// concurrent writers.
pub async fn file_pool(max_connections: u32) -> TempDb {
    let path = std::env::temp_dir().join(format!("{}.db", unique_name("lingo_test")));
    let pool = db::connect(&format!("sqlite://{}", path.display()), max_connections)
        .await
        .expect("Failed to open file database");
    TempDb { pool, path }
}

/// Spawns the app on a random port and returns its base URL.
pub async fn spawn_app(pool: SqlitePool) -> String {
    let app = routes::create_router(AppState::new(pool, test_config()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

pub async fn create_user(pool: &SqlitePool, username: &str) -> i64 {
    users::insert(pool, username, "not-a-real-hash", "user")
        .await
        .expect("Failed to insert user")
        .id
}

pub async fn create_admin(pool: &SqlitePool, username: &str, password: &str) -> i64 {
    let hash = hash_password(password).unwrap();
    users::insert(pool, username, &hash, "admin").await.unwrap().id
}

pub async fn user_points(pool: &SqlitePool, user_id: i64) -> i64 {
    users::points_of(pool, user_id).await.unwrap().unwrap()
}

pub async fn create_language(pool: &SqlitePool, slug: &str) -> Language {
    content::insert_language(
        pool,
        &CreateLanguageRequest {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_lesson(pool: &SqlitePool, language_id: i64, slug: &str, position: i64, points: i64) -> Lesson {
    let req = CreateLessonRequest {
        language_id,
        slug: slug.to_string(),
        title: format!("Lesson {}", slug),
        content: "<p>Body</p>".to_string(),
        position,
        points,
    };
    content::insert_lesson(pool, &req, &req.content).await.unwrap()
}

pub async fn create_lesson_question(pool: &SqlitePool, lesson_id: i64, correct_answer: &str, points: i64) -> i64 {
    let mut conn = pool.acquire().await.unwrap();
    content::insert_question(
        &mut conn,
        &CreateQuestionRequest {
            lesson_id: Some(lesson_id),
            quiz_id: None,
            question_type: "text".to_string(),
            question_text: "Which tag makes text bold?".to_string(),
            options: Vec::new(),
            correct_answer: Some(correct_answer.to_string()),
            explanation: None,
            points,
            difficulty: 1,
            answers: Vec::new(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn create_quiz(pool: &SqlitePool, language_id: i64, points: i64, passing_score: i64) -> Quiz {
    content::insert_quiz(
        pool,
        &CreateQuizRequest {
            language_id,
            title: "Checkpoint".to_string(),
            description: None,
            points,
            passing_score,
        },
    )
    .await
    .unwrap()
}

/// A quiz question with one correct and one wrong choice.
pub struct SeededQuizQuestion {
    pub id: i64,
    pub correct_answer_id: i64,
    pub wrong_answer_id: i64,
}

pub async fn create_quiz_question(pool: &SqlitePool, quiz_id: i64, points: i64) -> SeededQuizQuestion {
    let question_id = {
        let mut conn = pool.acquire().await.unwrap();
        content::insert_question(
            &mut conn,
            &CreateQuestionRequest {
                lesson_id: None,
                quiz_id: Some(quiz_id),
                question_type: "single".to_string(),
                question_text: format!("Worth {} points", points),
                options: Vec::new(),
                correct_answer: None,
                explanation: None,
                points,
                difficulty: 1,
                answers: vec![
                    CreateAnswerRequest {
                        answer_text: "right".to_string(),
                        is_correct: true,
                    },
                    CreateAnswerRequest {
                        answer_text: "wrong".to_string(),
                        is_correct: false,
                    },
                ],
            },
        )
        .await
        .unwrap()
        .id
    };

    let answers = content::answers_for_questions(pool, &[question_id]).await.unwrap();
    let correct = answers.iter().find(|a| a.is_correct).unwrap();
    let wrong = answers.iter().find(|a| !a.is_correct).unwrap();

    SeededQuizQuestion {
        id: question_id,
        correct_answer_id: correct.id,
        wrong_answer_id: wrong.id,
    }
}

pub async fn create_exercise(pool: &SqlitePool, lesson_id: i64, title: &str, points: i64) -> i64 {
    content::insert_exercise(
        pool,
        &CreateExerciseRequest {
            lesson_id,
            title: title.to_string(),
            description: None,
            instructions: None,
            starter_code: None,
            solution_code: Some("<strong>a</strong>".to_string()),
            test_cases: serde_json::json!([]),
            points,
            difficulty: "beginner".to_string(),
            position: 0,
        },
    )
    .await
    .unwrap()
    .id
}
