//! Task model
//!
//! Table: tasks
//!
//! Tasks are the central entity of the platform - a unit of work handed to a
//! lead, collaborators, and directing leadership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tc_core::traits::{Auditable, Entity, Id, Identifiable, SoftDeletable, Timestamped};
use validator::Validate;

use crate::task_number::TaskNumber;

/// Persisted task status
///
/// `Overdue` exists as a persisted value for imported legacy rows, but the
/// platform itself never transitions into it: overdue is derived on read via
/// [`Task::is_overdue`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Overdue,
    Paused,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Database string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Paused => "paused",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Urgent,
    Important,
    #[default]
    Normal,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Important => "important",
            Self::Normal => "normal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "urgent" => Some(Self::Urgent),
            "important" => Some(Self::Important),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<Id>,

    /// Year-scoped sequential number, e.g. `#25-042`
    pub task_number: TaskNumber,

    #[validate(length(min = 1, max = 500))]
    pub title: String,

    pub description: Option<String>,

    pub deadline: DateTime<Utc>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Progress 0-100, derived from the checklist when one exists
    #[validate(range(min = 0, max = 100))]
    pub progress: i32,

    pub completed_at: Option<DateTime<Utc>>,

    /// One level of nesting in practice
    pub parent_task_id: Option<Id>,

    pub created_by_id: Option<Id>,

    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: None,
            task_number: TaskNumber::default(),
            title: String::new(),
            description: None,
            deadline: DateTime::<Utc>::UNIX_EPOCH,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            progress: 0,
            completed_at: None,
            parent_task_id: None,
            created_by_id: None,
            deleted: false,
            deleted_at: None,
            deleted_by_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Task {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl SoftDeletable for Task {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Auditable for Task {
    fn created_by_id(&self) -> Option<Id> {
        self.created_by_id
    }

    fn updated_by_id(&self) -> Option<Id> {
        None
    }
}

impl Entity for Task {
    const TABLE_NAME: &'static str = "tasks";
    const TYPE_NAME: &'static str = "Task";
}

impl Task {
    /// Create a new task with a deadline
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            deadline,
            ..Default::default()
        }
    }

    /// Read-derived overdue view: deadline passed and not completed.
    /// Never persisted as a status transition.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline && !self.status.is_completed()
    }

    /// Status as displayed, with overdue derived at read time
    pub fn effective_status(&self, now: DateTime<Utc>) -> TaskStatus {
        if self.is_overdue(now) {
            TaskStatus::Overdue
        } else {
            self.status
        }
    }
}

/// DTO for creating a task
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub parent_task_id: Option<Id>,
}
