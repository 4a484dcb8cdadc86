//! Task lifecycle services
//!
//! Creation (with atomic task-number allocation), checklist-driven progress
//! recomputation, the explicit transition to Completed, and soft deletion.
//!
//! Progress recomputation and the Completed transition are deliberately two
//! separate operations: a finished checklist updates progress to 100 but the
//! task stays open until someone explicitly completes it.

use chrono::{DateTime, Datelike, Utc};
use tc_core::error::TcError;
use tc_core::result::{ServiceResult, TcResult};
use tc_core::traits::{Id, UserContext};
use tc_journals::JournalService;
use tc_kpi::{checklist_satisfied, recompute_progress};
use tc_models::{
    validate_assignment_set, Assignment, AssignmentDraft, ChecklistItem, CreateTaskDto, Task,
    TaskNumber, TaskStatus,
};

use crate::stores::{AssignmentStore, ChecklistStore, TaskStore, UserDirectory};
use crate::validate::run_validations;

/// Service for creating tasks with their initial assignment set
pub struct CreateTaskService<'a> {
    tasks: &'a dyn TaskStore,
    assignments: &'a dyn AssignmentStore,
    users: &'a dyn UserDirectory,
    journals: &'a JournalService,
}

impl<'a> CreateTaskService<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        assignments: &'a dyn AssignmentStore,
        users: &'a dyn UserDirectory,
        journals: &'a JournalService,
    ) -> Self {
        Self {
            tasks,
            assignments,
            users,
            journals,
        }
    }

    pub async fn call(
        &self,
        dto: CreateTaskDto,
        assignment_drafts: Vec<AssignmentDraft>,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Task, Vec<Assignment>)> {
        self.create(dto, assignment_drafts, caller, now).await.into()
    }

    async fn create(
        &self,
        dto: CreateTaskDto,
        assignment_drafts: Vec<AssignmentDraft>,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<(Task, Vec<Assignment>)> {
        run_validations(&dto)?;
        validate_assignment_set(&assignment_drafts)?;
        for draft in &assignment_drafts {
            let user = self
                .users
                .find_user(draft.user_id)
                .await?
                .ok_or_else(|| TcError::not_found("User", "id", draft.user_id))?;
            if draft.role == tc_models::AssignmentRole::Director && !user.top_leadership {
                return Err(tc_core::error::ValidationErrors::single(
                    "role",
                    format!(
                        "user {} cannot hold the directing role without a top-leadership position",
                        user.name
                    ),
                )
                .into());
            }
        }

        let mut task = Task::new(dto.title, dto.deadline);
        task.description = dto.description;
        task.priority = dto.priority;
        task.parent_task_id = dto.parent_task_id;
        task.created_by_id = Some(caller.id());
        task.created_at = Some(now);
        task.updated_at = Some(now);
        // placeholder; the store allocates the real per-year number
        task.task_number = TaskNumber::for_year(now.year(), 0);

        let task = self.tasks.create_task(task).await?;
        let task_id = task
            .id
            .ok_or_else(|| TcError::Internal("created task has no id".into()))?;
        let assignments = self
            .assignments
            .replace_for_task(task_id, &assignment_drafts)
            .await?;

        self.journals
            .record_task_created(
                task_id,
                caller.id(),
                format!("task {} created", task.task_number),
                now,
            )
            .await?;
        tracing::info!(task_id, number = %task.task_number, "task created");

        Ok((task, assignments))
    }
}

/// Service recomputing derived progress after checklist changes
pub struct RecomputeProgressService<'a> {
    tasks: &'a dyn TaskStore,
    checklist: &'a dyn ChecklistStore,
    journals: &'a JournalService,
}

impl<'a> RecomputeProgressService<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        checklist: &'a dyn ChecklistStore,
        journals: &'a JournalService,
    ) -> Self {
        Self {
            tasks,
            checklist,
            journals,
        }
    }

    /// Toggle one checklist item and recompute the owning task's progress
    pub async fn toggle_item(
        &self,
        item_id: Id,
        completed: bool,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<(ChecklistItem, Task)> {
        let result: TcResult<(ChecklistItem, Task)> = async {
            let item = self
                .checklist
                .set_item_completed(item_id, completed, now)
                .await?;
            let task = self.recompute(item.task_id, caller, now).await?;
            Ok((item, task))
        }
        .await;
        result.into()
    }

    /// Recompute and persist a task's derived progress
    pub async fn call(
        &self,
        task_id: Id,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<Task> {
        self.recompute(task_id, caller, now).await.into()
    }

    async fn recompute(
        &self,
        task_id: Id,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<Task> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .ok_or_else(|| TcError::not_found("Task", "id", task_id))?;

        let items = self.checklist.items_for_task(task_id).await?;
        let Some(progress) = recompute_progress(&items) else {
            return Ok(task);
        };
        if progress == task.progress {
            return Ok(task);
        }

        let updated = self.tasks.update_progress(task_id, progress, now).await?;
        self.journals
            .record_progress_update(task_id, caller.id(), task.progress, progress, now)
            .await?;
        tracing::debug!(task_id, progress, "progress recomputed");
        Ok(updated)
    }
}

/// Service for the explicit transition to Completed
pub struct MarkCompletedService<'a> {
    tasks: &'a dyn TaskStore,
    assignments: &'a dyn AssignmentStore,
    checklist: &'a dyn ChecklistStore,
    journals: &'a JournalService,
}

impl<'a> MarkCompletedService<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        assignments: &'a dyn AssignmentStore,
        checklist: &'a dyn ChecklistStore,
        journals: &'a JournalService,
    ) -> Self {
        Self {
            tasks,
            assignments,
            checklist,
            journals,
        }
    }

    /// Execute the transition. `override_checklist` lets the lead complete a
    /// task whose checklist is not (or never was) fully ticked.
    pub async fn call(
        &self,
        task_id: Id,
        override_checklist: bool,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<Task> {
        self.complete(task_id, override_checklist, caller, now)
            .await
            .into()
    }

    async fn complete(
        &self,
        task_id: Id,
        override_checklist: bool,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<Task> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| TcError::not_found("Task", "id", task_id))?;

        if task.status.is_completed() {
            return Err(TcError::state(format!(
                "task {} is already completed",
                task.task_number
            )));
        }

        let assignments = self.assignments.assignments_for_task(task_id).await?;
        let caller_is_lead = assignments
            .iter()
            .any(|a| a.is_lead() && a.user_id == caller.id());
        if !caller.is_admin() && !caller_is_lead {
            return Err(TcError::permission(
                "only an administrator or the lead may complete a task",
            ));
        }

        let items = self.checklist.items_for_task(task_id).await?;
        if !override_checklist && !checklist_satisfied(&items) {
            return Err(TcError::state(format!(
                "task {} has unfinished checklist items",
                task.task_number
            )));
        }

        let updated = self
            .tasks
            .update_status(task_id, TaskStatus::Completed, Some(now), now)
            .await?;
        self.journals
            .record_status_change(
                task_id,
                caller.id(),
                format!("task {} marked completed", task.task_number),
                now,
            )
            .await?;
        tracing::info!(task_id, "task completed");
        Ok(updated)
    }
}

/// Service for soft deletion
pub struct SoftDeleteTaskService<'a> {
    tasks: &'a dyn TaskStore,
    journals: &'a JournalService,
}

impl<'a> SoftDeleteTaskService<'a> {
    pub fn new(tasks: &'a dyn TaskStore, journals: &'a JournalService) -> Self {
        Self { tasks, journals }
    }

    pub async fn call(
        &self,
        task_id: Id,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        self.delete(task_id, caller, now).await.into()
    }

    async fn delete(
        &self,
        task_id: Id,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<()> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .ok_or_else(|| TcError::not_found("Task", "id", task_id))?;
        if task.deleted {
            return Err(TcError::state(format!(
                "task {} is already deleted",
                task.task_number
            )));
        }
        if !caller.is_admin() && task.created_by_id != Some(caller.id()) {
            return Err(TcError::permission(
                "only an administrator or the creator may delete a task",
            ));
        }

        self.tasks.soft_delete(task_id, caller.id(), now).await?;
        self.journals
            .record_task_deleted(task_id, caller.id(), now)
            .await?;
        tracing::info!(task_id, "task soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Caller, MemBackend};
    use chrono::TimeZone;
    use std::sync::Arc;
    use tc_journals::{InMemoryJournalStore, JournalAction};
    use tc_models::{AssignmentRole, TaskPriority};

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn journal_service() -> (Arc<InMemoryJournalStore>, JournalService) {
        let store = Arc::new(InMemoryJournalStore::new());
        (store.clone(), JournalService::new(store))
    }

    fn dto(title: &str) -> CreateTaskDto {
        CreateTaskDto {
            title: title.into(),
            description: None,
            deadline: utc(2025, 3, 10),
            priority: TaskPriority::Normal,
            parent_task_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_numbers() {
        let backend = MemBackend::new();
        backend.add_user(100, "An", Some(1), false);
        let (_store, journals) = journal_service();
        let service = CreateTaskService::new(&backend, &backend, &backend, &journals);
        let drafts = vec![AssignmentDraft::new(100, AssignmentRole::Lead)];

        let (first, _) = service
            .call(dto("First"), drafts.clone(), &Caller::admin(1), utc(2025, 3, 1))
            .await
            .into_result()
            .unwrap();
        let (second, _) = service
            .call(dto("Second"), drafts, &Caller::admin(1), utc(2025, 3, 2))
            .await
            .into_result()
            .unwrap();

        assert_eq!(first.task_number.to_string(), "#25-001");
        assert_eq!(second.task_number.to_string(), "#25-002");
        assert_eq!(first.created_by_id, Some(1));
    }

    #[tokio::test]
    async fn test_create_rejects_leadless_set() {
        let backend = MemBackend::new();
        backend.add_user(100, "An", Some(1), false);
        let (_store, journals) = journal_service();
        let service = CreateTaskService::new(&backend, &backend, &backend, &journals);

        let result = service
            .call(
                dto("No lead"),
                vec![AssignmentDraft::new(100, AssignmentRole::Collaborator)],
                &Caller::admin(1),
                utc(2025, 3, 1),
            )
            .await;
        assert!(result.validation_errors().is_some());
    }

    #[tokio::test]
    async fn test_toggle_item_recomputes_progress_and_journals() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.status = TaskStatus::InProgress;
        });
        let item1 = backend.add_checklist_item(task_id, "step one");
        let _item2 = backend.add_checklist_item(task_id, "step two");

        let (store, journals) = journal_service();
        let service = RecomputeProgressService::new(&backend, &backend, &journals);

        let result = service
            .toggle_item(item1, true, &Caller::user(100), utc(2025, 3, 3))
            .await;
        let (_, task) = result.into_result().unwrap();
        assert_eq!(task.progress, 50);

        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, JournalAction::ProgressRecomputed);
        assert_eq!(entries[0].notes.as_deref(), Some("progress 0 -> 50"));
    }

    #[tokio::test]
    async fn test_recompute_without_checklist_is_a_noop() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.progress = 40;
        });
        let (store, journals) = journal_service();
        let service = RecomputeProgressService::new(&backend, &backend, &journals);

        let task = service
            .call(task_id, &Caller::user(100), utc(2025, 3, 3))
            .await
            .into_result()
            .unwrap();
        assert_eq!(task.progress, 40);
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_full_checklist_does_not_complete_task() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.status = TaskStatus::InProgress;
        });
        let item = backend.add_checklist_item(task_id, "only step");
        let (_store, journals) = journal_service();
        let service = RecomputeProgressService::new(&backend, &backend, &journals);

        let (_, task) = service
            .toggle_item(item, true, &Caller::user(100), utc(2025, 3, 3))
            .await
            .into_result()
            .unwrap();
        assert_eq!(task.progress, 100);
        // completion stays an explicit, separate action
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_mark_completed_gates() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.status = TaskStatus::InProgress;
        });
        backend.add_assignment(task_id, 100, AssignmentRole::Lead);
        let item = backend.add_checklist_item(task_id, "step");
        let (_store, journals) = journal_service();
        let service = MarkCompletedService::new(&backend, &backend, &backend, &journals);

        // unfinished checklist blocks without the override
        let blocked = service
            .call(task_id, false, &Caller::user(100), utc(2025, 3, 9))
            .await;
        assert!(matches!(blocked.error(), Some(TcError::State { .. })));

        // a collaborator may not complete
        let forbidden = service
            .call(task_id, true, &Caller::user(101), utc(2025, 3, 9))
            .await;
        assert!(matches!(
            forbidden.error(),
            Some(TcError::PermissionDenied { .. })
        ));

        backend.set_item(item, true);
        let task = service
            .call(task_id, false, &Caller::user(100), utc(2025, 3, 9))
            .await
            .into_result()
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(utc(2025, 3, 9)));

        // completing twice is a state error
        let again = service
            .call(task_id, false, &Caller::user(100), utc(2025, 3, 9))
            .await;
        assert!(matches!(again.error(), Some(TcError::State { .. })));
    }

    #[tokio::test]
    async fn test_mark_completed_override_without_checklist() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.status = TaskStatus::InProgress;
        });
        backend.add_assignment(task_id, 100, AssignmentRole::Lead);
        let (_store, journals) = journal_service();
        let service = MarkCompletedService::new(&backend, &backend, &backend, &journals);

        // no checklist at all: only the override path can complete
        let blocked = service
            .call(task_id, false, &Caller::user(100), utc(2025, 3, 9))
            .await;
        assert!(blocked.is_failure());

        let task = service
            .call(task_id, true, &Caller::user(100), utc(2025, 3, 9))
            .await
            .into_result()
            .unwrap();
        assert!(task.status.is_completed());
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let backend = MemBackend::new();
        let task_id = backend.add_task(|task| {
            task.deadline = utc(2025, 3, 10);
            task.created_by_id = Some(5);
        });
        let (store, journals) = journal_service();
        let service = SoftDeleteTaskService::new(&backend, &journals);

        let forbidden = service
            .call(task_id, &Caller::user(6), utc(2025, 3, 9))
            .await;
        assert!(matches!(
            forbidden.error(),
            Some(TcError::PermissionDenied { .. })
        ));

        service
            .call(task_id, &Caller::user(5), utc(2025, 3, 9))
            .await
            .into_result()
            .unwrap();
        let task = backend.find_task_sync(task_id);
        assert!(task.deleted);
        assert_eq!(task.deleted_by_id, Some(5));

        let again = service.call(task_id, &Caller::user(5), utc(2025, 3, 9)).await;
        assert!(matches!(again.error(), Some(TcError::State { .. })));

        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].action, JournalAction::Deleted);
    }
}
