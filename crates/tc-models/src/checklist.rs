//! Checklist item model
//!
//! Table: checklist_items
//!
//! Sub-steps of a task. Completed-item ratio drives the task's derived
//! progress; completing the last item does not by itself complete the task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tc_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// Checklist item entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Option<Id>,

    pub task_id: Id,

    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub completed: bool,

    /// Display/execution order
    #[serde(default)]
    pub position: i32,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for ChecklistItem {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ChecklistItem {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for ChecklistItem {
    const TABLE_NAME: &'static str = "checklist_items";
    const TYPE_NAME: &'static str = "ChecklistItem";
}

impl ChecklistItem {
    pub fn new(task_id: Id, title: impl Into<String>, position: i32) -> Self {
        Self {
            id: None,
            task_id,
            title: title.into(),
            completed: false,
            position,
            created_at: None,
            updated_at: None,
        }
    }
}
