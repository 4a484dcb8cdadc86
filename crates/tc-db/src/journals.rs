//! Journal repository
//!
//! Persists audit entries appended by the journal service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_journals::{Journal, JournalAction, JournalStore, JournalType};

use crate::repository::{RepositoryError, RepositoryResult};

const JOURNAL_COLUMNS: &str = "id, journable_type, journable_id, user_id, action, notes, created_at";

/// Journal database row
#[derive(Debug, Clone, FromRow)]
pub struct JournalRow {
    pub id: i64,
    pub journable_type: String,
    pub journable_id: i64,
    pub user_id: i64,
    pub action: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JournalRow {
    pub fn into_journal(self) -> RepositoryResult<Journal> {
        let journable_type = JournalType::parse(&self.journable_type).ok_or_else(|| {
            RepositoryError::Validation(format!("unknown journal type {}", self.journable_type))
        })?;
        let action = JournalAction::parse(&self.action).ok_or_else(|| {
            RepositoryError::Validation(format!("unknown journal action {}", self.action))
        })?;
        Ok(Journal {
            id: Some(self.id),
            journable_type,
            journable_id: self.journable_id,
            user_id: self.user_id,
            action,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Journal repository implementation
pub struct JournalRepository {
    pool: PgPool,
}

impl JournalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, journal: &Journal) -> RepositoryResult<JournalRow> {
        let row = sqlx::query_as::<_, JournalRow>(&format!(
            r#"
            INSERT INTO journals (journable_type, journable_id, user_id, action, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            JOURNAL_COLUMNS
        ))
        .bind(journal.journable_type.as_str())
        .bind(journal.journable_id)
        .bind(journal.user_id)
        .bind(journal.action.as_str())
        .bind(&journal.notes)
        .bind(journal.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_for_entity(
        &self,
        journable_type: JournalType,
        journable_id: Id,
    ) -> RepositoryResult<Vec<JournalRow>> {
        let rows = sqlx::query_as::<_, JournalRow>(&format!(
            r#"
            SELECT {}
            FROM journals
            WHERE journable_type = $1 AND journable_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
            JOURNAL_COLUMNS
        ))
        .bind(journable_type.as_str())
        .bind(journable_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl JournalStore for JournalRepository {
    async fn append(&self, journal: &Journal) -> TcResult<Id> {
        let row = self.insert(journal).await?;
        Ok(row.id)
    }

    async fn for_entity(
        &self,
        journable_type: JournalType,
        journable_id: Id,
    ) -> TcResult<Vec<Journal>> {
        let rows = self.find_for_entity(journable_type, journable_id).await?;
        rows.into_iter()
            .map(|row| row.into_journal().map_err(Into::into))
            .collect()
    }
}
