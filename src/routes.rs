// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, content, leaderboard, progress, submission},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// Everything except register and login sits behind the JWT middleware;
/// admin routes additionally require the admin role.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let language_routes = Router::new()
        .route("/", get(content::list_languages))
        .route("/{slug}/lessons", get(content::list_lessons))
        .route("/{slug}/lessons/{lesson_slug}", get(content::get_lesson))
        .route(
            "/{slug}/lessons/{lesson_slug}/complete",
            post(submission::complete_lesson),
        )
        .route("/{slug}/quizzes", get(content::list_quizzes))
        .route("/{slug}/quizzes/{quiz_id}", get(content::get_quiz))
        .route("/{slug}/quizzes/{quiz_id}/submit", post(submission::submit_quiz));

    let lesson_routes = Router::new()
        .route("/{lesson_id}/complete", post(submission::complete_lesson_by_id))
        .route(
            "/{lesson_id}/questions/{question_id}/answer",
            post(submission::answer_question),
        )
        .route(
            "/{lesson_id}/exercises/{exercise_id}/submit",
            post(submission::submit_lesson_exercise),
        );

    let exercise_routes = Router::new()
        .route("/{exercise_id}/submit", post(submission::run_exercise))
        .route(
            "/{exercise_id}/submissions",
            get(submission::list_exercise_submissions),
        );

    let admin_routes = Router::new()
        .route("/languages", post(admin::create_language))
        .route("/lessons", post(admin::create_lesson))
        .route("/questions", post(admin::create_question))
        .route("/exercises", post(admin::create_exercise))
        .route("/quizzes", post(admin::create_quiz))
        .layer(middleware::from_fn(admin_middleware));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/languages", language_routes)
        .nest("/lessons", lesson_routes)
        .nest("/exercises", exercise_routes)
        .route("/progress", get(progress::list_progress))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/users/{id}/stats", get(leaderboard::get_user_stats))
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", public_auth_routes)
        .nest("/api", protected_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
