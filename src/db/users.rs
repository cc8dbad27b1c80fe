// src/db/users.rs

use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::models::user::User;

const USER_COLUMNS: &str = "id, username, password, role, avatar, points, created_at";

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_username<'e, E>(executor: E, username: &str) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(
    executor: E,
    username: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO users (username, password, role, created_at) VALUES ($1, $2, $3, $4) \
         RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(chrono::Utc::now())
        .fetch_one(executor)
        .await
}

/// Adds `delta` to the user's cumulative points and returns the new total.
/// Callers run this in the same transaction as the progress update.
pub async fn add_points(conn: &mut SqliteConnection, user_id: i64, delta: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("UPDATE users SET points = points + $1 WHERE id = $2 RETURNING points")
        .bind(delta)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn points_of<'e, E>(executor: E, user_id: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>("SELECT points FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Competition rank: 1 + number of users with strictly more points.
pub async fn rank_for_points<'e, E>(executor: E, points: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let above: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE points > $1")
        .bind(points)
        .fetch_one(executor)
        .await?;
    Ok(above + 1)
}
