//! Task repository
//!
//! Database operations for tasks, including the atomic per-year task-number
//! allocation (counter row upserted in the same transaction as the insert).

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_models::{Task, TaskNumber, TaskPriority, TaskStatus};
use tc_services::TaskStore;

use crate::repository::{db_err, RepositoryError, RepositoryResult};

const TASK_COLUMNS: &str = r#"id, number_year, number_sequence, title, description, deadline,
       priority, status, progress, completed_at, parent_task_id, created_by_id,
       deleted, deleted_at, deleted_by_id, created_at, updated_at"#;

/// Task database row
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub number_year: i32,
    pub number_sequence: i32,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub priority: String,
    pub status: String,
    pub progress: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub parent_task_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    pub fn into_task(self) -> RepositoryResult<Task> {
        let status = TaskStatus::parse(&self.status)
            .ok_or_else(|| RepositoryError::Validation(format!("unknown status {}", self.status)))?;
        let priority = TaskPriority::parse(&self.priority).ok_or_else(|| {
            RepositoryError::Validation(format!("unknown priority {}", self.priority))
        })?;
        Ok(Task {
            id: Some(self.id),
            task_number: TaskNumber::for_year(self.number_year, self.number_sequence as u32),
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            priority,
            status,
            progress: self.progress,
            completed_at: self.completed_at,
            parent_task_id: self.parent_task_id,
            created_by_id: self.created_by_id,
            deleted: self.deleted,
            deleted_at: self.deleted_at,
            deleted_by_id: self.deleted_by_id,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Task repository implementation
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a task, allocating the next number for the task's year in the
    /// same transaction so numbers stay monotonic and are never reused.
    pub async fn create(&self, task: &Task) -> RepositoryResult<TaskRow> {
        let year = task.created_at.unwrap_or(task.deadline).year();

        let mut tx = self.pool.begin().await?;

        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO task_number_sequences (year, last_sequence)
            VALUES ($1, 1)
            ON CONFLICT (year)
            DO UPDATE SET last_sequence = task_number_sequences.last_sequence + 1
            RETURNING last_sequence
            "#,
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (
                number_year, number_sequence, title, description, deadline,
                priority, status, progress, completed_at, parent_task_id,
                created_by_id, deleted, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, NOW(), NOW()
            )
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(year.rem_euclid(100))
        .bind(sequence)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.deadline)
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(task.progress)
        .bind(task.completed_at)
        .bind(task.parent_task_id)
        .bind(task.created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    pub async fn set_progress(
        &self,
        id: Id,
        progress: i32,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET progress = $1, updated_at = $2
            WHERE id = $3 AND deleted = FALSE
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(progress)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Task with id {} not found", id)))?;

        Ok(row)
    }

    pub async fn set_status(
        &self,
        id: Id,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET status = $1, completed_at = $2, updated_at = $3
            WHERE id = $4 AND deleted = FALSE
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(status.as_str())
        .bind(completed_at)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Task with id {} not found", id)))?;

        Ok(row)
    }

    pub async fn mark_deleted(
        &self,
        id: Id,
        actor_id: Id,
        at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted = TRUE, deleted_at = $1, deleted_by_id = $2, updated_at = $1
            WHERE id = $3 AND deleted = FALSE
            "#,
        )
        .bind(at)
        .bind(actor_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Task with id {} not found",
                id
            )));
        }

        Ok(())
    }

}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_task(&self, id: Id) -> TcResult<Option<Task>> {
        match self.find_by_id(id).await {
            Ok(Some(row)) => Ok(Some(row.into_task()?)),
            Ok(None) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_task(&self, task: Task) -> TcResult<Task> {
        let row = self.create(&task).await?;
        Ok(row.into_task()?)
    }

    async fn update_progress(
        &self,
        id: Id,
        progress: i32,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task> {
        let row = self.set_progress(id, progress, updated_at).await?;
        Ok(row.into_task()?)
    }

    async fn update_status(
        &self,
        id: Id,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task> {
        let row = self
            .set_status(id, status, completed_at, updated_at)
            .await?;
        Ok(row.into_task()?)
    }

    async fn soft_delete(&self, id: Id, actor_id: Id, at: DateTime<Utc>) -> TcResult<()> {
        self.mark_deleted(id, actor_id, at).await?;
        Ok(())
    }
}
