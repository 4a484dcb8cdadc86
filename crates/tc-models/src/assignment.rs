//! Assignment model
//!
//! Table: task_assignments
//!
//! Links a task to a user with one of three roles. The role set of a task is
//! always replaced wholesale, validated by [`validate_assignment_set`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tc_core::error::ValidationErrors;
use tc_core::traits::{Entity, Id, Identifiable, Timestamped};

/// Assignment role, a closed enum
///
/// Display labels live in [`AssignmentRole::label`] only; core logic never
/// compares label strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    /// The single primary-responsible assignee ("Chủ trì")
    Lead,
    /// Supporting assignee with an own completion flag ("Phối hợp")
    Collaborator,
    /// Senior-leadership oversight ("Chỉ đạo")
    Director,
}

impl AssignmentRole {
    /// Database string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Collaborator => "collaborator",
            Self::Director => "director",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lead" => Some(Self::Lead),
            "collaborator" => Some(Self::Collaborator),
            "director" => Some(Self::Director),
            _ => None,
        }
    }

    /// Localized display label, presentation boundary only
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lead => "Chủ trì",
            Self::Collaborator => "Phối hợp",
            Self::Director => "Chỉ đạo",
        }
    }
}

/// Assignment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Option<Id>,

    pub task_id: Id,

    pub user_id: Id,

    pub role: AssignmentRole,

    /// Collaborator's own done flag, settable only by the assignee.
    /// Always false for Lead and Director assignments.
    pub collaboration_completed: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Assignment {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Assignment {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Assignment {
    const TABLE_NAME: &'static str = "task_assignments";
    const TYPE_NAME: &'static str = "Assignment";
}

impl Assignment {
    pub fn new(task_id: Id, user_id: Id, role: AssignmentRole) -> Self {
        Self {
            id: None,
            task_id,
            user_id,
            role,
            collaboration_completed: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_lead(&self) -> bool {
        self.role == AssignmentRole::Lead
    }
}

/// Incoming assignment for a full-set replacement
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub user_id: Id,
    pub role: AssignmentRole,
}

impl AssignmentDraft {
    pub fn new(user_id: Id, role: AssignmentRole) -> Self {
        Self { user_id, role }
    }
}

/// Validate the role invariants of a full assignment set:
/// exactly one Lead, and at most one role per user.
///
/// Director eligibility needs user data and is checked by the service layer.
pub fn validate_assignment_set(drafts: &[AssignmentDraft]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let lead_count = drafts
        .iter()
        .filter(|d| d.role == AssignmentRole::Lead)
        .count();
    match lead_count {
        0 => errors.add("role", "exactly one lead assignment is required, found none"),
        1 => {}
        n => errors.add(
            "role",
            format!("exactly one lead assignment is required, found {}", n),
        ),
    }

    let mut seen = HashSet::new();
    for draft in drafts {
        if !seen.insert(draft.user_id) {
            errors.add(
                "userId",
                format!("user {} appears in more than one role", draft.user_id),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
