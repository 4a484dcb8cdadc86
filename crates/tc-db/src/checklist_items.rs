//! Checklist item repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_models::ChecklistItem;
use tc_services::ChecklistStore;

use crate::repository::{RepositoryError, RepositoryResult};

const ITEM_COLUMNS: &str = "id, task_id, title, completed, position, created_at, updated_at";

/// Checklist item database row
#[derive(Debug, Clone, FromRow)]
pub struct ChecklistItemRow {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistItemRow {
    pub fn into_item(self) -> ChecklistItem {
        ChecklistItem {
            id: Some(self.id),
            task_id: self.task_id,
            title: self.title,
            completed: self.completed,
            position: self.position,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Checklist item repository implementation
pub struct ChecklistItemRepository {
    pool: PgPool,
}

impl ChecklistItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<ChecklistItemRow>> {
        let rows = sqlx::query_as::<_, ChecklistItemRow>(&format!(
            "SELECT {} FROM checklist_items WHERE task_id = $1 ORDER BY position ASC, id ASC",
            ITEM_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create(
        &self,
        task_id: Id,
        title: &str,
        position: i32,
    ) -> RepositoryResult<ChecklistItemRow> {
        let row = sqlx::query_as::<_, ChecklistItemRow>(&format!(
            r#"
            INSERT INTO checklist_items (task_id, title, completed, position, created_at, updated_at)
            VALUES ($1, $2, FALSE, $3, NOW(), NOW())
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(task_id)
        .bind(title)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn set_completed(
        &self,
        id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<ChecklistItemRow> {
        let row = sqlx::query_as::<_, ChecklistItemRow>(&format!(
            r#"
            UPDATE checklist_items
            SET completed = $1, updated_at = $2
            WHERE id = $3
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(completed)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Checklist item with id {} not found", id))
        })?;

        Ok(row)
    }
}

#[async_trait]
impl ChecklistStore for ChecklistItemRepository {
    async fn items_for_task(&self, task_id: Id) -> TcResult<Vec<ChecklistItem>> {
        let rows = self.find_by_task(task_id).await?;
        Ok(rows.into_iter().map(ChecklistItemRow::into_item).collect())
    }

    async fn set_item_completed(
        &self,
        item_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<ChecklistItem> {
        let row = self.set_completed(item_id, completed, updated_at).await?;
        Ok(row.into_item())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = ChecklistItemRow {
            id: 1,
            task_id: 7,
            title: "Verify identity".into(),
            completed: true,
            position: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let item = row.into_item();
        assert!(item.completed);
        assert_eq!(item.task_id, 7);
    }
}
