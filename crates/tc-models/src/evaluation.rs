//! Evaluation model
//!
//! Table: task_evaluations, unique on (task_id, assignment_id)
//!
//! A human-assigned quality score for one assignment of a completed task,
//! bounded by the completion-score cap. Resubmission overwrites in place;
//! there is exactly one current evaluation per assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tc_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// Evaluation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: Option<Id>,

    pub task_id: Id,

    /// References a specific assignment, not just task+user
    pub assignment_id: Id,

    pub evaluator_id: Id,

    /// 0-10, one decimal place
    pub score: f64,

    pub comments: Option<String>,

    pub evaluated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Evaluation {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Evaluation {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.evaluated_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.evaluated_at
    }
}

impl Entity for Evaluation {
    const TABLE_NAME: &'static str = "task_evaluations";
    const TYPE_NAME: &'static str = "Evaluation";
}

impl Evaluation {
    pub fn new(task_id: Id, assignment_id: Id, evaluator_id: Id, score: f64) -> Self {
        Self {
            id: None,
            task_id,
            assignment_id,
            evaluator_id,
            score: round_score(score),
            comments: None,
            evaluated_at: None,
        }
    }
}

/// Round a score to the platform's one-decimal precision
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// DTO for submitting (or resubmitting) an evaluation
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEvaluationDto {
    /// 0-10 scale; the effective upper bound is the completion-score cap
    #[validate(range(min = 0.0, max = 10.0))]
    pub score: f64,

    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}
