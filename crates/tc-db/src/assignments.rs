//! Assignment repository
//!
//! The full-set replace runs delete-then-insert inside one transaction, so
//! no reader ever observes zero or duplicate leads mid-update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_models::{Assignment, AssignmentDraft, AssignmentRole};
use tc_services::AssignmentStore;

use crate::repository::{RepositoryError, RepositoryResult};

const ASSIGNMENT_COLUMNS: &str =
    "id, task_id, user_id, role, collaboration_completed, created_at, updated_at";

/// Assignment database row
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub role: String,
    pub collaboration_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssignmentRow {
    pub fn into_assignment(self) -> RepositoryResult<Assignment> {
        let role = AssignmentRole::parse(&self.role)
            .ok_or_else(|| RepositoryError::Validation(format!("unknown role {}", self.role)))?;
        Ok(Assignment {
            id: Some(self.id),
            task_id: self.task_id,
            user_id: self.user_id,
            role,
            collaboration_completed: self.collaboration_completed,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Assignment repository implementation
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<AssignmentRow>> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM task_assignments WHERE id = $1",
            ASSIGNMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<AssignmentRow>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM task_assignments WHERE task_id = $1 ORDER BY id ASC",
            ASSIGNMENT_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Atomic full replacement of a task's assignment set
    pub async fn replace(
        &self,
        task_id: Id,
        drafts: &[AssignmentDraft],
    ) -> RepositoryResult<Vec<AssignmentRow>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM task_assignments WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        let mut rows = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let row = sqlx::query_as::<_, AssignmentRow>(&format!(
                r#"
                INSERT INTO task_assignments (
                    task_id, user_id, role, collaboration_completed, created_at, updated_at
                ) VALUES ($1, $2, $3, FALSE, NOW(), NOW())
                RETURNING {}
                "#,
                ASSIGNMENT_COLUMNS
            ))
            .bind(task_id)
            .bind(draft.user_id)
            .bind(draft.role.as_str())
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;

        tracing::debug!(task_id, count = rows.len(), "assignment set replaced");
        Ok(rows)
    }

    pub async fn set_collaboration_flag(
        &self,
        id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<AssignmentRow> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            UPDATE task_assignments
            SET collaboration_completed = $1, updated_at = $2
            WHERE id = $3
            RETURNING {}
            "#,
            ASSIGNMENT_COLUMNS
        ))
        .bind(completed)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Assignment with id {} not found", id))
        })?;

        Ok(row)
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn find_assignment(&self, id: Id) -> TcResult<Option<Assignment>> {
        match self.find_by_id(id).await {
            Ok(Some(row)) => Ok(Some(row.into_assignment()?)),
            Ok(None) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn assignments_for_task(&self, task_id: Id) -> TcResult<Vec<Assignment>> {
        let rows = self.find_by_task(task_id).await?;
        rows.into_iter()
            .map(|row| row.into_assignment().map_err(Into::into))
            .collect()
    }

    async fn replace_for_task(
        &self,
        task_id: Id,
        drafts: &[AssignmentDraft],
    ) -> TcResult<Vec<Assignment>> {
        let rows = self.replace(task_id, drafts).await?;
        rows.into_iter()
            .map(|row| row.into_assignment().map_err(Into::into))
            .collect()
    }

    async fn set_collaboration_completed(
        &self,
        assignment_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Assignment> {
        let row = self
            .set_collaboration_flag(assignment_id, completed, updated_at)
            .await?;
        Ok(row.into_assignment()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = AssignmentRow {
            id: 1,
            task_id: 7,
            user_id: 100,
            role: "lead".into(),
            collaboration_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let assignment = row.into_assignment().unwrap();
        assert!(assignment.is_lead());
    }

    #[test]
    fn test_row_conversion_rejects_unknown_role() {
        let row = AssignmentRow {
            id: 1,
            task_id: 7,
            user_id: 100,
            role: "owner".into(),
            collaboration_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.into_assignment().is_err());
    }
}
