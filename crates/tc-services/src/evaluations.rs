//! Evaluation submission and listing
//!
//! One evaluation per assignment: submission is an upsert bounded by the
//! completion-score cap, only on completed tasks, only by the authorized
//! evaluator. The rejection payload carries the cap and its explanation so
//! the caller can show the evaluator *why*.

use chrono::{DateTime, Utc};
use tc_core::error::{TcError, ValidationErrors};
use tc_core::result::{ServiceResult, TcResult};
use tc_core::traits::Id;
use tc_kpi::{cap_explanation, completion_score_for, max_leadership_score};
use tc_models::evaluation::round_score;
use tc_models::{Assignment, Evaluation, SubmitEvaluationDto};

use crate::stores::{
    AssignmentStore, EvaluationAuthorizer, EvaluationFilter, EvaluationStore, TaskStore,
};
use crate::validate::run_validations;

/// Service for submitting (or resubmitting) an evaluation
pub struct SubmitEvaluationService<'a> {
    tasks: &'a dyn TaskStore,
    assignments: &'a dyn AssignmentStore,
    evaluations: &'a dyn EvaluationStore,
    authorizer: &'a dyn EvaluationAuthorizer,
}

impl<'a> SubmitEvaluationService<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        assignments: &'a dyn AssignmentStore,
        evaluations: &'a dyn EvaluationStore,
        authorizer: &'a dyn EvaluationAuthorizer,
    ) -> Self {
        Self {
            tasks,
            assignments,
            evaluations,
            authorizer,
        }
    }

    /// Execute the submission
    pub async fn call(
        &self,
        task_id: Id,
        assignment_id: Id,
        evaluator_id: Id,
        dto: SubmitEvaluationDto,
        now: DateTime<Utc>,
    ) -> ServiceResult<Evaluation> {
        self.submit(task_id, assignment_id, evaluator_id, dto, now)
            .await
            .into()
    }

    async fn submit(
        &self,
        task_id: Id,
        assignment_id: Id,
        evaluator_id: Id,
        dto: SubmitEvaluationDto,
        now: DateTime<Utc>,
    ) -> TcResult<Evaluation> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .ok_or_else(|| TcError::not_found("Task", "id", task_id))?;
        let assignment = self
            .assignments
            .find_assignment(assignment_id)
            .await?
            .filter(|a| a.task_id == task_id)
            .ok_or_else(|| TcError::not_found("Assignment", "id", assignment_id))?;

        if !task.status.is_completed() {
            return Err(TcError::state(format!(
                "task {} is not completed; evaluations require a completed task",
                task.task_number
            )));
        }

        if !self
            .authorizer
            .is_authorized(evaluator_id, &task, &assignment)
            .await?
        {
            return Err(TcError::permission(format!(
                "user {} is not the authorized evaluator for assignment {}",
                evaluator_id, assignment_id
            )));
        }

        run_validations(&dto)?;

        let score = round_score(dto.score);
        let completion = completion_score_for(&task, now);
        let cap = max_leadership_score(completion);
        if score > cap as f64 {
            let mut errors = ValidationErrors::new();
            errors.add(
                "score",
                format!(
                    "must not exceed {} for this assignment: {}",
                    cap,
                    cap_explanation(completion)
                ),
            );
            return Err(errors.into());
        }

        let mut evaluation = Evaluation::new(task_id, assignment_id, evaluator_id, score);
        evaluation.comments = dto.comments;
        evaluation.evaluated_at = Some(now);

        let stored = self.evaluations.upsert(evaluation).await?;
        tracing::info!(
            task_id,
            assignment_id,
            evaluator_id,
            score,
            "evaluation submitted"
        );
        Ok(stored)
    }
}

/// Service for evaluation listings and pending-evaluation views
pub struct ListEvaluationsService<'a> {
    evaluations: &'a dyn EvaluationStore,
}

impl<'a> ListEvaluationsService<'a> {
    pub fn new(evaluations: &'a dyn EvaluationStore) -> Self {
        Self { evaluations }
    }

    pub async fn call(&self, filter: &EvaluationFilter) -> TcResult<Vec<Evaluation>> {
        self.evaluations.list(filter).await
    }

    /// Assignments of completed tasks still waiting for their evaluation
    pub async fn pending(&self, task_id: Option<Id>) -> TcResult<Vec<Assignment>> {
        self.evaluations.unevaluated_assignments(task_id).await
    }
}
