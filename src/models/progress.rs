// src/models/progress.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of content a progress record can attach to.
/// Stored in `user_progress.entity_type` as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EntityKind {
    Lesson,
    Question,
    Exercise,
    Quiz,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lesson => "lesson",
            EntityKind::Question => "question",
            EntityKind::Exercise => "exercise",
            EntityKind::Quiz => "quiz",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to one trackable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedEntity {
    Lesson(i64),
    Question(i64),
    Exercise(i64),
    Quiz(i64),
}

impl TrackedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            TrackedEntity::Lesson(_) => EntityKind::Lesson,
            TrackedEntity::Question(_) => EntityKind::Question,
            TrackedEntity::Exercise(_) => EntityKind::Exercise,
            TrackedEntity::Quiz(_) => EntityKind::Quiz,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            TrackedEntity::Lesson(id)
            | TrackedEntity::Question(id)
            | TrackedEntity::Exercise(id)
            | TrackedEntity::Quiz(id) => id,
        }
    }

    pub fn new(kind: EntityKind, id: i64) -> Self {
        match kind {
            EntityKind::Lesson => TrackedEntity::Lesson(id),
            EntityKind::Question => TrackedEntity::Question(id),
            EntityKind::Exercise => TrackedEntity::Exercise(id),
            EntityKind::Quiz => TrackedEntity::Quiz(id),
        }
    }
}

impl fmt::Display for TrackedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.id())
    }
}

/// Completion state of a progress record.
/// `Completed` is absorbing: once reached it is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Represents the 'user_progress' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: i64,
    pub user_id: i64,
    pub entity_type: EntityKind,
    pub entity_id: i64,
    pub status: ProgressStatus,

    /// Points earned for this entity. Set once, on completion.
    pub score: i64,

    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_accessed_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProgressRecord {
    pub fn entity(&self) -> TrackedEntity {
        TrackedEntity::new(self.entity_type, self.entity_id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

/// Query parameters for listing the caller's progress.
#[derive(Debug, Default, Deserialize)]
pub struct ProgressFilter {
    pub entity_type: Option<EntityKind>,
    pub status: Option<ProgressStatus>,
}
