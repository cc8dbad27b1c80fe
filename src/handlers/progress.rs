// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{db::progress, error::AppError, models::progress::ProgressFilter, utils::jwt::Claims};

/// Lists the caller's progress records, most recently accessed first.
pub async fn list_progress(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ProgressFilter>,
) -> Result<impl IntoResponse, AppError> {
    let records = progress::list_progress(&pool, claims.user_id()?, &filter).await?;
    Ok(Json(records))
}
