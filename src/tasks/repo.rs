use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::ApiError;

/// Task priority, stored as a Postgres enum. Unrecognized client input
/// falls back to `Mid` rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "priority")]
pub enum Priority {
    High,
    Mid,
    Low,
}

impl Priority {
    pub fn from_param(s: &str) -> Self {
        match s {
            "High" => Priority::High,
            "Low" => Priority::Low,
            _ => Priority::Mid,
        }
    }

    /// Rank used by priority ordering: High before Mid before Low.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Mid => 1,
            Priority::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Mid
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub bucket: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
    pub priority: Priority,
    pub tag: Option<String>,
    pub reminder_enabled: bool,
    pub done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Normalized field set shared by create and full update.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub bucket: String,
    pub due_at: Option<OffsetDateTime>,
    pub priority: Priority,
    pub tag: Option<String>,
    pub reminder_enabled: bool,
    pub done: bool,
}

const TASK_COLUMNS: &str = "id, user_id, title, description, bucket, due_at, priority, tag, \
                            reminder_enabled, done, created_at, updated_at";

impl Task {
    pub async fn create(db: &PgPool, owner: i64, fields: &TaskFields) -> Result<Task, ApiError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks
                (user_id, title, description, bucket, due_at, priority, tag, reminder_enabled, done)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(owner)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.bucket)
        .bind(fields.due_at)
        .bind(fields.priority)
        .bind(&fields.tag)
        .bind(fields.reminder_enabled)
        .bind(fields.done)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Full-field replace. The `(id, user_id)` filter makes a foreign
    /// task indistinguishable from a missing one.
    pub async fn update(
        db: &PgPool,
        owner: i64,
        id: i64,
        fields: &TaskFields,
    ) -> Result<Task, ApiError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET
                title = $1, description = $2, bucket = $3, due_at = $4, priority = $5,
                tag = $6, reminder_enabled = $7, done = $8, updated_at = now()
            WHERE id = $9 AND user_id = $10
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.bucket)
        .bind(fields.due_at)
        .bind(fields.priority)
        .bind(&fields.tag)
        .bind(fields.reminder_enabled)
        .bind(fields.done)
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await?;
        task.ok_or(ApiError::NotFound)
    }

    /// Narrow mutation of the done flag, for interactive toggling.
    pub async fn toggle_done(
        db: &PgPool,
        owner: i64,
        id: i64,
        done: bool,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE tasks SET done = $1, updated_at = now() WHERE id = $2 AND user_id = $3",
        )
        .bind(done)
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    /// Hard delete, no undo.
    pub async fn delete(db: &PgPool, owner: i64, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    /// All of the owner's tasks, optionally restricted to one bucket,
    /// in stable storage order (`id ASC`). Display ordering is applied
    /// afterwards by [`crate::tasks::query::order`].
    pub async fn list_by_owner(
        db: &PgPool,
        owner: i64,
        bucket: Option<&str>,
    ) -> Result<Vec<Task>, ApiError> {
        let tasks = match bucket {
            Some(bucket) => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 AND bucket = $2 ORDER BY id ASC",
                ))
                .bind(owner)
                .bind(bucket)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY id ASC",
                ))
                .bind(owner)
                .fetch_all(db)
                .await?
            }
        };
        Ok(tasks)
    }
}
