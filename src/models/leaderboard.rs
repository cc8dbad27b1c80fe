// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Time window a leaderboard counts completions in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    All,
    Week,
    Month,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    pub time_frame: TimeFrame,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
}

/// One ranked row, aggregated from `users` and `user_progress`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub points: i64,

    /// Completed progress records inside the window.
    pub completed_count: i64,

    /// 1 + number of users with strictly more points.
    pub rank: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardPage {
    pub data: Vec<LeaderboardEntry>,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
}

/// Public statistics for one user.
#[derive(Debug, Serialize)]
pub struct UserStats {
    pub points: i64,
    pub rank: i64,
    #[serde(rename = "completedLessons")]
    pub completed_lessons: i64,
    pub badges: i64,
}
