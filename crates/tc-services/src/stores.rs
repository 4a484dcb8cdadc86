//! Storage ports
//!
//! The services own these trait seams; `tc-db` implements them against
//! PostgreSQL, tests implement them in memory. Each port is as narrow as the
//! operations that consume it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_kpi::KpiSourceData;
use tc_models::{
    Assignment, AssignmentDraft, ChecklistItem, Department, Evaluation, Task, TaskStatus, User,
};

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_task(&self, id: Id) -> TcResult<Option<Task>>;

    /// Persist a new task. The store allocates the year-scoped sequential
    /// task number atomically; the number on the passed entity is ignored.
    async fn create_task(&self, task: Task) -> TcResult<Task>;

    async fn update_progress(
        &self,
        id: Id,
        progress: i32,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task>;

    async fn update_status(
        &self,
        id: Id,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task>;

    async fn soft_delete(&self, id: Id, actor_id: Id, at: DateTime<Utc>) -> TcResult<()>;
}

/// Assignment persistence
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn find_assignment(&self, id: Id) -> TcResult<Option<Assignment>>;

    async fn assignments_for_task(&self, task_id: Id) -> TcResult<Vec<Assignment>>;

    /// Replace the full assignment set of a task in one atomic step; no
    /// reader observes zero or duplicate leads mid-update.
    async fn replace_for_task(
        &self,
        task_id: Id,
        drafts: &[AssignmentDraft],
    ) -> TcResult<Vec<Assignment>>;

    async fn set_collaboration_completed(
        &self,
        assignment_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Assignment>;
}

/// Filter for evaluation listings
#[derive(Debug, Clone, Default)]
pub struct EvaluationFilter {
    pub task_id: Option<Id>,
    pub evaluator_id: Option<Id>,
}

impl EvaluationFilter {
    pub fn for_task(task_id: Id) -> Self {
        Self {
            task_id: Some(task_id),
            ..Default::default()
        }
    }

    pub fn by_evaluator(evaluator_id: Id) -> Self {
        Self {
            evaluator_id: Some(evaluator_id),
            ..Default::default()
        }
    }
}

/// Evaluation persistence
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Insert or overwrite, keyed on (task_id, assignment_id). The key is
    /// unique at the storage layer; concurrent submissions resolve to
    /// last-writer-wins, never duplicate rows.
    async fn upsert(&self, evaluation: Evaluation) -> TcResult<Evaluation>;

    async fn list(&self, filter: &EvaluationFilter) -> TcResult<Vec<Evaluation>>;

    async fn any_for_task(&self, task_id: Id) -> TcResult<bool>;

    /// Assignments of completed tasks that have no evaluation yet
    /// ("pending evaluation" views)
    async fn unevaluated_assignments(&self, task_id: Option<Id>) -> TcResult<Vec<Assignment>>;
}

/// Checklist persistence
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    async fn items_for_task(&self, task_id: Id) -> TcResult<Vec<ChecklistItem>>;

    async fn set_item_completed(
        &self,
        item_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<ChecklistItem>;
}

/// Read access to staff records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Id) -> TcResult<Option<User>>;

    async fn users(&self) -> TcResult<Vec<User>>;

    async fn departments(&self) -> TcResult<Vec<Department>>;
}

/// Resolves evaluation authority.
///
/// Who evaluates whom is decided by the organizational hierarchy outside this
/// core; the contract here is only that exactly one evaluator is authorized
/// per assignment at submission time.
#[async_trait]
pub trait EvaluationAuthorizer: Send + Sync {
    async fn is_authorized(
        &self,
        evaluator_id: Id,
        task: &Task,
        assignment: &Assignment,
    ) -> TcResult<bool>;
}

/// Row source for KPI aggregation
#[async_trait]
pub trait KpiSource: Send + Sync {
    /// All rows needed to aggregate tasks whose deadline falls in
    /// `[start, end)`, together with their assignments, evaluations, and the
    /// staff directory.
    async fn kpi_rows(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TcResult<KpiSourceData>;
}
