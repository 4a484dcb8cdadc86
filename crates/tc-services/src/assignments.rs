//! Assignment replacement and collaboration completion
//!
//! A task's assignment set is only ever replaced wholesale: the single-Lead
//! invariant is validated before persistence and the store applies the swap
//! atomically. Replacement is refused once any evaluation references the
//! task, because evaluations point at specific assignment rows.

use chrono::{DateTime, Utc};
use tc_core::error::{TcError, ValidationErrors};
use tc_core::result::{ServiceResult, TcResult};
use tc_core::traits::{Id, UserContext};
use tc_journals::JournalService;
use tc_models::{validate_assignment_set, Assignment, AssignmentDraft, AssignmentRole};

use crate::stores::{AssignmentStore, EvaluationStore, TaskStore, UserDirectory};

/// Build a replacement draft set that makes `new_lead` the lead and demotes
/// the previous lead to collaborator, keeping everyone else's role.
pub fn drafts_with_new_lead(current: &[Assignment], new_lead: Id) -> Vec<AssignmentDraft> {
    let mut drafts: Vec<AssignmentDraft> = current
        .iter()
        .map(|assignment| {
            let role = if assignment.user_id == new_lead {
                AssignmentRole::Lead
            } else if assignment.is_lead() {
                AssignmentRole::Collaborator
            } else {
                assignment.role
            };
            AssignmentDraft::new(assignment.user_id, role)
        })
        .collect();

    if !drafts.iter().any(|d| d.user_id == new_lead) {
        drafts.push(AssignmentDraft::new(new_lead, AssignmentRole::Lead));
    }
    drafts
}

/// Service for replacing a task's full assignment set
pub struct ReplaceAssignmentsService<'a> {
    tasks: &'a dyn TaskStore,
    assignments: &'a dyn AssignmentStore,
    evaluations: &'a dyn EvaluationStore,
    users: &'a dyn UserDirectory,
    journals: &'a JournalService,
}

impl<'a> ReplaceAssignmentsService<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        assignments: &'a dyn AssignmentStore,
        evaluations: &'a dyn EvaluationStore,
        users: &'a dyn UserDirectory,
        journals: &'a JournalService,
    ) -> Self {
        Self {
            tasks,
            assignments,
            evaluations,
            users,
            journals,
        }
    }

    /// Execute the replacement
    pub async fn call(
        &self,
        task_id: Id,
        drafts: Vec<AssignmentDraft>,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<Assignment>> {
        self.replace(task_id, drafts, caller, now).await.into()
    }

    async fn replace(
        &self,
        task_id: Id,
        drafts: Vec<AssignmentDraft>,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<Vec<Assignment>> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| TcError::not_found("Task", "id", task_id))?;

        let current = self.assignments.assignments_for_task(task_id).await?;
        let caller_is_lead = current
            .iter()
            .any(|a| a.is_lead() && a.user_id == caller.id());
        if !caller.is_admin() && !caller_is_lead {
            return Err(TcError::permission(
                "only an administrator or the current lead may reassign a task",
            ));
        }

        if self.evaluations.any_for_task(task_id).await? {
            return Err(TcError::state(format!(
                "assignments of task {} cannot be replaced: evaluations already exist",
                task.task_number
            )));
        }

        validate_assignment_set(&drafts)?;
        self.check_draft_users(&drafts).await?;

        let replaced = self.assignments.replace_for_task(task_id, &drafts).await?;

        let lead = drafts
            .iter()
            .find(|d| d.role == AssignmentRole::Lead)
            .map(|d| d.user_id)
            .unwrap_or_default();
        self.journals
            .record_assignments_replaced(
                task_id,
                caller.id(),
                format!("{} assignees, lead is user {}", replaced.len(), lead),
                now,
            )
            .await?;
        tracing::info!(task_id, count = replaced.len(), "assignments replaced");

        Ok(replaced)
    }

    /// Every draft user must exist; directing requires a top-leadership position
    async fn check_draft_users(&self, drafts: &[AssignmentDraft]) -> TcResult<()> {
        let mut errors = ValidationErrors::new();
        for draft in drafts {
            let user = self
                .users
                .find_user(draft.user_id)
                .await?
                .ok_or_else(|| TcError::not_found("User", "id", draft.user_id))?;
            if draft.role == AssignmentRole::Director && !user.top_leadership {
                errors.add(
                    "role",
                    format!(
                        "user {} cannot hold the directing role without a top-leadership position",
                        user.name
                    ),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

/// Service for a collaborator marking their own contribution complete
pub struct CollaborationCompletionService<'a> {
    assignments: &'a dyn AssignmentStore,
    journals: &'a JournalService,
}

impl<'a> CollaborationCompletionService<'a> {
    pub fn new(assignments: &'a dyn AssignmentStore, journals: &'a JournalService) -> Self {
        Self {
            assignments,
            journals,
        }
    }

    pub async fn call(
        &self,
        assignment_id: Id,
        completed: bool,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<Assignment> {
        self.set(assignment_id, completed, caller, now).await.into()
    }

    async fn set(
        &self,
        assignment_id: Id,
        completed: bool,
        caller: &dyn UserContext,
        now: DateTime<Utc>,
    ) -> TcResult<Assignment> {
        let assignment = self
            .assignments
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| TcError::not_found("Assignment", "id", assignment_id))?;

        if assignment.role != AssignmentRole::Collaborator {
            return Err(TcError::state(format!(
                "assignment {} is not a collaborator assignment",
                assignment_id
            )));
        }
        if assignment.user_id != caller.id() {
            return Err(TcError::permission(
                "only the assignee may change their collaboration completion flag",
            ));
        }

        let updated = self
            .assignments
            .set_collaboration_completed(assignment_id, completed, now)
            .await?;
        if completed {
            self.journals
                .record_collaboration_completed(assignment_id, caller.id(), now)
                .await?;
        }
        Ok(updated)
    }
}
