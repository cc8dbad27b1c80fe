// src/services/leaderboard.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::{
    config::{LEADERBOARD_DEFAULT_PER_PAGE, LEADERBOARD_MAX_PER_PAGE, MONTH_WINDOW_DAYS, WEEK_WINDOW_DAYS},
    db::{progress, users},
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, LeaderboardPage, LeaderboardParams, TimeFrame, UserStats},
        progress::EntityKind,
    },
};

/// Earliest `completed_at` counted by a time frame, relative to `now`.
pub fn window_start(time_frame: TimeFrame, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match time_frame {
        TimeFrame::All => None,
        TimeFrame::Week => Some(now - Duration::days(WEEK_WINDOW_DAYS)),
        TimeFrame::Month => Some(now - Duration::days(MONTH_WINDOW_DAYS)),
    }
}

/// Clamps raw paging parameters to `(page, per_page)`.
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let per_page = per_page
        .unwrap_or(LEADERBOARD_DEFAULT_PER_PAGE)
        .clamp(1, LEADERBOARD_MAX_PER_PAGE);
    let page = page.unwrap_or(1).max(1);
    (page, per_page)
}

/// Number of pages needed for `total` rows; at least 1.
pub fn last_page(total: i64, per_page: i64) -> i64 {
    ((total + per_page - 1) / per_page).max(1)
}

/// Users with at least one completed record in the window, ordered by
/// cumulative points (ties by user id).
pub async fn leaderboard(pool: &SqlitePool, params: &LeaderboardParams) -> Result<LeaderboardPage, AppError> {
    let (page, per_page) = page_bounds(params.page, params.per_page);
    let since = window_start(params.time_frame, Utc::now());

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT up.user_id)
        FROM user_progress up
        WHERE up.status = 'completed'
          AND ($1 IS NULL OR julianday(up.completed_at) >= julianday($1))
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    let data = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT
            u.id,
            u.username AS name,
            u.avatar,
            u.points,
            COUNT(up.id) AS completed_count,
            (SELECT COUNT(*) FROM users o WHERE o.points > u.points) + 1 AS rank
        FROM users u
        JOIN user_progress up ON up.user_id = u.id
        WHERE up.status = 'completed'
          AND ($1 IS NULL OR julianday(up.completed_at) >= julianday($1))
        GROUP BY u.id
        ORDER BY u.points DESC, u.id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(since)
    .bind(per_page)
    .bind((page - 1) * per_page)
    .fetch_all(pool)
    .await?;

    Ok(LeaderboardPage {
        data,
        total,
        current_page: page,
        per_page,
        last_page: last_page(total, per_page),
    })
}

pub async fn user_stats(pool: &SqlitePool, user_id: i64) -> Result<UserStats, AppError> {
    let points = users::points_of(pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(UserStats {
        points,
        rank: users::rank_for_points(pool, points).await?,
        completed_lessons: progress::count_completed(pool, user_id, EntityKind::Lesson).await?,
        badges: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_clamps() {
        assert_eq!(page_bounds(None, None), (1, LEADERBOARD_DEFAULT_PER_PAGE));
        assert_eq!(page_bounds(Some(0), Some(0)), (1, 1));
        assert_eq!(page_bounds(Some(3), Some(1000)), (3, LEADERBOARD_MAX_PER_PAGE));
    }

    #[test]
    fn last_page_rounds_up_and_never_hits_zero() {
        assert_eq!(last_page(0, 10), 1);
        assert_eq!(last_page(10, 10), 1);
        assert_eq!(last_page(11, 10), 2);
    }

    #[test]
    fn windows_reach_back_from_now() {
        let now = Utc::now();
        assert_eq!(window_start(TimeFrame::All, now), None);
        assert_eq!(window_start(TimeFrame::Week, now), Some(now - Duration::days(7)));
        assert_eq!(window_start(TimeFrame::Month, now), Some(now - Duration::days(30)));
    }
}
