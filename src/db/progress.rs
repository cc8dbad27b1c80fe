// src/db/progress.rs

use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use crate::models::progress::{EntityKind, ProgressFilter, ProgressRecord, TrackedEntity};

const PROGRESS_COLUMNS: &str = "id, user_id, entity_type, entity_id, status, score, \
     completed_at, last_accessed_at, created_at, updated_at";

/// Change applied to a progress record by `upsert_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPatch {
    /// Only refresh `last_accessed_at`.
    Touch,
    /// Move `not_started` to `in_progress`.
    Start,
    /// Move to `completed` and record the score. No-op on completed records.
    Complete { score: i64 },
}

#[derive(Debug, Clone)]
pub struct ProgressUpsert {
    pub record: ProgressRecord,
    /// True only for the call that moved the record into `completed`.
    pub newly_completed: bool,
}

pub async fn get_progress<'e, E>(
    executor: E,
    user_id: i64,
    entity: TrackedEntity,
) -> Result<Option<ProgressRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress \
         WHERE user_id = $1 AND entity_type = $2 AND entity_id = $3"
    );
    sqlx::query_as::<_, ProgressRecord>(&sql)
        .bind(user_id)
        .bind(entity.kind())
        .bind(entity.id())
        .fetch_optional(executor)
        .await
}

/// Finds or creates the record for (user, entity) and applies `patch`.
///
/// Row creation goes through `ON CONFLICT DO NOTHING` on the unique key, so a
/// concurrent first submission for the same key never surfaces as an error.
/// Completion is a conditional update; its affected-row count is what tells
/// the caller whether points are due.
pub async fn upsert_progress(
    conn: &mut SqliteConnection,
    user_id: i64,
    entity: TrackedEntity,
    patch: ProgressPatch,
) -> Result<ProgressUpsert, sqlx::Error> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO user_progress
            (user_id, entity_type, entity_id, status, score, last_accessed_at, created_at, updated_at)
        VALUES ($1, $2, $3, 'not_started', 0, $4, $4, $4)
        ON CONFLICT (user_id, entity_type, entity_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(entity.kind())
    .bind(entity.id())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let newly_completed = match patch {
        ProgressPatch::Touch => {
            touch(conn, user_id, entity, now).await?;
            false
        }
        ProgressPatch::Start => {
            sqlx::query(
                r#"
                UPDATE user_progress
                SET status = CASE WHEN status = 'not_started' THEN 'in_progress' ELSE status END,
                    last_accessed_at = $4,
                    updated_at = $4
                WHERE user_id = $1 AND entity_type = $2 AND entity_id = $3
                "#,
            )
            .bind(user_id)
            .bind(entity.kind())
            .bind(entity.id())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            false
        }
        ProgressPatch::Complete { score } => {
            let result = sqlx::query(
                r#"
                UPDATE user_progress
                SET status = 'completed',
                    score = $4,
                    completed_at = $5,
                    last_accessed_at = $5,
                    updated_at = $5
                WHERE user_id = $1 AND entity_type = $2 AND entity_id = $3
                  AND status <> 'completed'
                "#,
            )
            .bind(user_id)
            .bind(entity.kind())
            .bind(entity.id())
            .bind(score)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            let transitioned = result.rows_affected() == 1;
            if !transitioned {
                touch(conn, user_id, entity, now).await?;
            }
            transitioned
        }
    };

    let record = get_progress(&mut *conn, user_id, entity)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(ProgressUpsert {
        record,
        newly_completed,
    })
}

async fn touch(
    conn: &mut SqliteConnection,
    user_id: i64,
    entity: TrackedEntity,
    now: chrono::DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE user_progress
        SET last_accessed_at = $4, updated_at = $4
        WHERE user_id = $1 AND entity_type = $2 AND entity_id = $3
        "#,
    )
    .bind(user_id)
    .bind(entity.kind())
    .bind(entity.id())
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Lists a user's progress, most recently accessed first.
pub async fn list_progress<'e, E>(
    executor: E,
    user_id: i64,
    filter: &ProgressFilter,
) -> Result<Vec<ProgressRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress \
         WHERE user_id = $1 \
           AND ($2 IS NULL OR entity_type = $2) \
           AND ($3 IS NULL OR status = $3) \
         ORDER BY last_accessed_at DESC, id DESC"
    );
    sqlx::query_as::<_, ProgressRecord>(&sql)
        .bind(user_id)
        .bind(filter.entity_type)
        .bind(filter.status)
        .fetch_all(executor)
        .await
}

/// Number of completed records of one kind for a user.
pub async fn count_completed<'e, E>(executor: E, user_id: i64, kind: EntityKind) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_progress \
         WHERE user_id = $1 AND entity_type = $2 AND status = 'completed'",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_one(executor)
    .await
}

/// Progress records of one kind for a set of entity ids.
pub async fn progress_for_entities<'e, E>(
    executor: E,
    user_id: i64,
    kind: EntityKind,
    entity_ids: &[i64],
) -> Result<Vec<ProgressRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    if entity_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = "
    ));
    query_builder.push_bind(user_id);
    query_builder.push(" AND entity_type = ");
    query_builder.push_bind(kind);
    query_builder.push(" AND entity_id IN (");

    let mut separated = query_builder.separated(",");
    for id in entity_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    query_builder
        .build_query_as::<ProgressRecord>()
        .fetch_all(executor)
        .await
}
