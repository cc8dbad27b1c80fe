// tests/api_tests.rs

mod common;

use std::collections::HashMap;

use axum::{body::Body, http::Request};
use common::*;
use lingo_backend::{routes, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Registers a fresh user and returns `(username, token)`.
async fn register_and_login(client: &reqwest::Client, address: &str) -> (String, String) {
    let username = unique_name("u");
    let password = "password123";

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let token = login(client, address, &username, password).await;
    (username, token)
}

async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let body: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    assert_eq!(body["type"], "Bearer");
    body["token"].as_str().expect("Token not found").to_string()
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app(test_pool().await).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = routes::create_router(AppState::new(test_pool().await, test_config()));

    let response = app
        .clone()
        .oneshot(Request::get("/api/leaderboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .oneshot(
            Request::get("/api/progress")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn register_login_and_me() {
    let address = spawn_app(test_pool().await).await;
    let client = reqwest::Client::new();
    let (username, token) = register_and_login(&client, &address).await;

    let me: Value = client
        .get(format!("{}/api/auth/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], username.as_str());
    assert_eq!(me["points"], 0);
    assert!(me.get("password").is_none());

    let duplicate = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    let bad_password = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": username, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_password.status().as_u16(), 401);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app(test_pool().await).await;
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": "yo", "password": "password123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["username"].is_array());
}

#[tokio::test]
async fn lesson_flow_over_http() {
    let pool = test_pool().await;
    let lang = create_language(&pool, "html").await;
    let intro = create_lesson(&pool, lang.id, "intro", 1, 20).await;
    let next = create_lesson(&pool, lang.id, "formatting", 2, 20).await;
    let question = create_lesson_question(&pool, intro.id, "<p>", 5).await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();
    let (_, token) = register_and_login(&client, &address).await;

    let empty = client
        .post(format!("{}/api/lessons/{}/questions/{}/answer", address, intro.id, question))
        .bearer_auth(&token)
        .json(&json!({ "answer": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status().as_u16(), 422);

    let missing_field = client
        .post(format!("{}/api/lessons/{}/questions/{}/answer", address, intro.id, question))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_field.status().as_u16(), 422);
    let body: Value = missing_field.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("answer"));

    let malformed = client
        .post(format!("{}/api/lessons/{}/questions/{}/answer", address, intro.id, question))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"answer\":")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status().as_u16(), 400);
    let body: Value = malformed.json().await.unwrap();
    assert!(body["error"].is_string());

    let verdict: Value = client
        .post(format!("{}/api/lessons/{}/questions/{}/answer", address, intro.id, question))
        .bearer_auth(&token)
        .json(&json!({ "answer": "<p>" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(verdict["is_correct"], true);
    assert_eq!(verdict["points"], 5);
    assert_eq!(verdict["status"], "completed");

    let detail: Value = client
        .get(format!("{}/api/languages/html/lessons/intro", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["questions"][0]["is_completed"], true);
    assert!(detail["questions"][0].get("correct_answer").is_none());
    assert_eq!(detail["user_progress"]["status"], "in_progress");
    assert!(detail["navigation"]["previous"].is_null());
    assert_eq!(detail["navigation"]["next"]["id"], next.id);

    let record: Value = client
        .post(format!("{}/api/languages/html/lessons/intro/complete", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["status"], "completed");
    assert_eq!(record["entity_type"], "lesson");

    let again = client
        .post(format!("{}/api/lessons/{}/complete", address, intro.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 200);

    let lessons: Value = client
        .get(format!("{}/api/languages/html/lessons", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lessons[0]["user_progress"]["status"], "completed");
    assert!(lessons[1]["user_progress"].is_null());

    let completed: Vec<Value> = client
        .get(format!("{}/api/progress?status=completed", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(completed.len(), 2);

    let me: Value = client
        .get(format!("{}/api/auth/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["points"], 25);

    let missing = client
        .get(format!("{}/api/languages/html/lessons/nope", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn quiz_flow_over_http() {
    let pool = test_pool().await;
    let lang = create_language(&pool, "python").await;
    let quiz = create_quiz(&pool, lang.id, 25, 70).await;
    let ten = create_quiz_question(&pool, quiz.id, 10).await;
    let twenty = create_quiz_question(&pool, quiz.id, 20).await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();
    let (_, token) = register_and_login(&client, &address).await;

    let listed: Value = client
        .get(format!("{}/api/languages/python/quizzes", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], quiz.id);
    let questions = listed[0]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for question in questions {
        let answers = question["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.get("is_correct").is_none()));
    }

    let detail: Value = client
        .get(format!("{}/api/languages/python/quizzes/{}", address, quiz.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["questions"].as_array().unwrap().len(), 2);
    assert_eq!(detail["questions"][0]["answers"].as_array().unwrap().len(), 2);
    assert!(detail["questions"][0]["answers"][0].get("is_correct").is_none());

    let empty = client
        .post(format!("{}/api/languages/python/quizzes/{}/submit", address, quiz.id))
        .bearer_auth(&token)
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status().as_u16(), 422);

    let answers: HashMap<i64, i64> = [
        (ten.id, ten.wrong_answer_id),
        (twenty.id, twenty.correct_answer_id),
    ]
    .into_iter()
    .collect();
    let result: Value = client
        .post(format!("{}/api/languages/python/quizzes/{}/submit", address, quiz.id))
        .bearer_auth(&token)
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["score"], 20);
    assert_eq!(result["total_points"], 30);
    assert_eq!(result["passed"], false);
    assert_eq!(result["points_earned"], 0);
    assert_eq!(result["attempt"]["quiz_id"], quiz.id);
}

#[tokio::test]
async fn exercise_run_records_history() {
    let pool = test_pool().await;
    let lang = create_language(&pool, "html").await;
    let lesson = create_lesson(&pool, lang.id, "intro", 1, 0).await;
    let exercise = create_exercise(&pool, lesson.id, "Headings", 12).await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();
    let (_, token) = register_and_login(&client, &address).await;

    let response = client
        .post(format!("{}/api/exercises/{}/submit", address, exercise))
        .bearer_auth(&token)
        .json(&json!({ "code": "<h1>Hi</h1>" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let run: Value = response.json().await.unwrap();
    assert_eq!(run["status"], "passed");
    assert_eq!(run["points_earned"], 12);

    let history: Vec<Value> = client
        .get(format!("{}/api/exercises/{}/submissions", address, exercise))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["code"], "<h1>Hi</h1>");
}

#[tokio::test]
async fn leaderboard_and_stats_over_http() {
    let pool = test_pool().await;
    let lang = create_language(&pool, "html").await;
    create_lesson(&pool, lang.id, "intro", 1, 30).await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();
    let (_, token) = register_and_login(&client, &address).await;

    let record: Value = client
        .post(format!("{}/api/languages/html/lessons/intro/complete", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = record["user_id"].as_i64().unwrap();

    let page: Value = client
        .get(format!("{}/api/leaderboard?time_frame=week&per_page=500", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["per_page"], 100);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], user_id);
    assert_eq!(page["data"][0]["rank"], 1);
    assert_eq!(page["data"][0]["completed_count"], 1);

    let stats: Value = client
        .get(format!("{}/api/users/{}/stats", address, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["points"], 30);
    assert_eq!(stats["rank"], 1);
    assert_eq!(stats["completedLessons"], 1);
    assert_eq!(stats["badges"], 0);

    let unknown = client
        .get(format!("{}/api/users/9999/stats", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_routes_check_role_and_sanitize_content() {
    let pool = test_pool().await;
    create_admin(&pool, "root_admin", "admin-password").await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();
    let (_, user_token) = register_and_login(&client, &address).await;
    let admin_token = login(&client, &address, "root_admin", "admin-password").await;

    let forbidden = client
        .post(format!("{}/api/admin/languages", address))
        .bearer_auth(&user_token)
        .json(&json!({ "slug": "go", "name": "Go" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let language: Value = client
        .post(format!("{}/api/admin/languages", address))
        .bearer_auth(&admin_token)
        .json(&json!({ "slug": "go", "name": "Go" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let language_id = language["id"].as_i64().unwrap();

    let bad_slug = client
        .post(format!("{}/api/admin/languages", address))
        .bearer_auth(&admin_token)
        .json(&json!({ "slug": "Not A Slug", "name": "Bad" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_slug.status().as_u16(), 422);

    let lesson_response = client
        .post(format!("{}/api/admin/lessons", address))
        .bearer_auth(&admin_token)
        .json(&json!({
            "language_id": language_id,
            "slug": "hello",
            "title": "Hello",
            "content": "<p>Hi</p><script>alert(1)</script>",
            "points": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(lesson_response.status().as_u16(), 201);
    let lesson: Value = lesson_response.json().await.unwrap();
    assert_eq!(lesson["content"], "<p>Hi</p>");

    let orphan = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&admin_token)
        .json(&json!({
            "question_type": "text",
            "question_text": "Who?",
            "correct_answer": "me",
            "points": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan.status().as_u16(), 422);

    let question = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&admin_token)
        .json(&json!({
            "lesson_id": lesson["id"],
            "question_type": "text",
            "question_text": "Who?",
            "correct_answer": "me",
            "points": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(question.status().as_u16(), 201);

    let missing_parent = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&admin_token)
        .json(&json!({
            "quiz_id": 9999,
            "question_type": "single",
            "question_text": "Pick",
            "points": 1,
            "answers": [{ "answer_text": "A", "is_correct": true }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_parent.status().as_u16(), 404);
}
