// src/db/mod.rs

//! Data access layer. Every function takes an executor or connection so the
//! submission services can run several of them inside one transaction.

pub mod content;
pub mod progress;
pub mod submissions;
pub mod users;

use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Opens the SQLite pool and applies the embedded migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        // In-memory databases live only as long as their connection.
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Opens a transaction that takes the database write lock immediately.
///
/// A deferred transaction that reads before writing cannot wait for the lock
/// when it upgrades; SQLite fails it with SQLITE_BUSY instead. Taking the lock
/// at `BEGIN` lets `busy_timeout` queue concurrent writers.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
