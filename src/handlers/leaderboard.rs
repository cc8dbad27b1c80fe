// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, models::leaderboard::LeaderboardParams, services::leaderboard};

pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(leaderboard::leaderboard(&pool, &params).await?))
}

pub async fn get_user_stats(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(leaderboard::user_stats(&pool, user_id).await?))
}
