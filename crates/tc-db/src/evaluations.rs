//! Evaluation repository
//!
//! The unique index on (task_id, assignment_id) is the storage-level
//! enforcement of "one current evaluation per assignment"; the upsert makes
//! concurrent submissions resolve to last-writer-wins instead of duplicates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_models::{Assignment, Evaluation};
use tc_services::{EvaluationFilter, EvaluationStore};

use crate::assignments::AssignmentRow;
use crate::repository::RepositoryResult;

const EVALUATION_COLUMNS: &str =
    "id, task_id, assignment_id, evaluator_id, score, comments, evaluated_at";

/// Evaluation database row
#[derive(Debug, Clone, FromRow)]
pub struct EvaluationRow {
    pub id: i64,
    pub task_id: i64,
    pub assignment_id: i64,
    pub evaluator_id: i64,
    pub score: f64,
    pub comments: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationRow {
    pub fn into_evaluation(self) -> Evaluation {
        Evaluation {
            id: Some(self.id),
            task_id: self.task_id,
            assignment_id: self.assignment_id,
            evaluator_id: self.evaluator_id,
            score: self.score,
            comments: self.comments,
            evaluated_at: Some(self.evaluated_at),
        }
    }
}

/// Evaluation repository implementation
pub struct EvaluationRepository {
    pool: PgPool,
}

impl EvaluationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert-or-overwrite on the (task_id, assignment_id) unique key
    pub async fn upsert_row(&self, evaluation: &Evaluation) -> RepositoryResult<EvaluationRow> {
        let row = sqlx::query_as::<_, EvaluationRow>(&format!(
            r#"
            INSERT INTO task_evaluations (
                task_id, assignment_id, evaluator_id, score, comments, evaluated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (task_id, assignment_id)
            DO UPDATE SET
                evaluator_id = EXCLUDED.evaluator_id,
                score = EXCLUDED.score,
                comments = EXCLUDED.comments,
                evaluated_at = EXCLUDED.evaluated_at
            RETURNING {}
            "#,
            EVALUATION_COLUMNS
        ))
        .bind(evaluation.task_id)
        .bind(evaluation.assignment_id)
        .bind(evaluation.evaluator_id)
        .bind(evaluation.score)
        .bind(&evaluation.comments)
        .bind(evaluation.evaluated_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_filtered(
        &self,
        filter: &EvaluationFilter,
    ) -> RepositoryResult<Vec<EvaluationRow>> {
        let rows = sqlx::query_as::<_, EvaluationRow>(&format!(
            r#"
            SELECT {}
            FROM task_evaluations
            WHERE ($1::BIGINT IS NULL OR task_id = $1)
              AND ($2::BIGINT IS NULL OR evaluator_id = $2)
            ORDER BY evaluated_at DESC, id DESC
            "#,
            EVALUATION_COLUMNS
        ))
        .bind(filter.task_id)
        .bind(filter.evaluator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn exists_for_task(&self, task_id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM task_evaluations WHERE task_id = $1)",
        )
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Assignments of completed tasks that have no evaluation yet
    pub async fn find_unevaluated_assignments(
        &self,
        task_id: Option<Id>,
    ) -> RepositoryResult<Vec<AssignmentRow>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT a.id, a.task_id, a.user_id, a.role, a.collaboration_completed,
                   a.created_at, a.updated_at
            FROM task_assignments a
            JOIN tasks t ON t.id = a.task_id
            LEFT JOIN task_evaluations e
              ON e.task_id = a.task_id AND e.assignment_id = a.id
            WHERE e.id IS NULL
              AND t.status = 'completed'
              AND t.deleted = FALSE
              AND ($1::BIGINT IS NULL OR a.task_id = $1)
            ORDER BY a.task_id ASC, a.id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl EvaluationStore for EvaluationRepository {
    async fn upsert(&self, evaluation: Evaluation) -> TcResult<Evaluation> {
        let row = self.upsert_row(&evaluation).await?;
        Ok(row.into_evaluation())
    }

    async fn list(&self, filter: &EvaluationFilter) -> TcResult<Vec<Evaluation>> {
        let rows = self.find_filtered(filter).await?;
        Ok(rows.into_iter().map(EvaluationRow::into_evaluation).collect())
    }

    async fn any_for_task(&self, task_id: Id) -> TcResult<bool> {
        Ok(self.exists_for_task(task_id).await?)
    }

    async fn unevaluated_assignments(&self, task_id: Option<Id>) -> TcResult<Vec<Assignment>> {
        let rows = self.find_unevaluated_assignments(task_id).await?;
        rows.into_iter()
            .map(|row| row.into_assignment().map_err(Into::into))
            .collect()
    }
}
