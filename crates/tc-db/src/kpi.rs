//! KPI row source
//!
//! Loads one consistent snapshot of the rows the aggregation kernel needs
//! for a deadline window: tasks, their assignments and evaluations, and the
//! staff directory. Snapshot reads only; KPI reporting tolerates stale data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tc_core::result::TcResult;
use tc_kpi::KpiSourceData;
use tc_services::KpiSource;

use crate::assignments::AssignmentRow;
use crate::evaluations::EvaluationRow;
use crate::repository::db_err;
use crate::tasks::TaskRow;
use crate::users::{DepartmentRow, UserRow};

/// Row source for KPI aggregation
pub struct KpiQueryExecutor {
    pool: PgPool,
}

impl KpiQueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KpiSource for KpiQueryExecutor {
    async fn kpi_rows(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TcResult<KpiSourceData> {
        let task_rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, number_year, number_sequence, title, description, deadline,
                   priority, status, progress, completed_at, parent_task_id, created_by_id,
                   deleted, deleted_at, deleted_by_id, created_at, updated_at
            FROM tasks
            WHERE deadline >= $1 AND deadline < $2 AND deleted = FALSE
            ORDER BY deadline ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let assignment_rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT a.id, a.task_id, a.user_id, a.role, a.collaboration_completed,
                   a.created_at, a.updated_at
            FROM task_assignments a
            JOIN tasks t ON t.id = a.task_id
            WHERE t.deadline >= $1 AND t.deadline < $2 AND t.deleted = FALSE
            ORDER BY a.task_id ASC, a.id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let evaluation_rows = sqlx::query_as::<_, EvaluationRow>(
            r#"
            SELECT e.id, e.task_id, e.assignment_id, e.evaluator_id, e.score,
                   e.comments, e.evaluated_at
            FROM task_evaluations e
            JOIN tasks t ON t.id = e.task_id
            WHERE t.deadline >= $1 AND t.deadline < $2 AND t.deleted = FALSE
            ORDER BY e.task_id ASC, e.id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let user_rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, login, department_id, admin, top_leadership, created_at, updated_at
             FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let department_rows = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, created_at, updated_at FROM departments ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let tasks = task_rows
            .into_iter()
            .map(|row| row.into_task().map_err(Into::into))
            .collect::<TcResult<Vec<_>>>()?;
        let assignments = assignment_rows
            .into_iter()
            .map(|row| row.into_assignment().map_err(Into::into))
            .collect::<TcResult<Vec<_>>>()?;

        Ok(KpiSourceData {
            tasks,
            assignments,
            evaluations: evaluation_rows
                .into_iter()
                .map(EvaluationRow::into_evaluation)
                .collect(),
            users: user_rows.into_iter().map(UserRow::into_user).collect(),
            departments: department_rows
                .into_iter()
                .map(DepartmentRow::into_department)
                .collect(),
        })
    }
}
