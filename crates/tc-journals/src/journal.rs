//! Journal model
//!
//! Table: journals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tc_core::traits::Id;

/// Journal type (what kind of entity this journal belongs to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    Task,
    Assignment,
    Evaluation,
}

impl JournalType {
    /// Get the database type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Assignment => "Assignment",
            Self::Evaluation => "Evaluation",
        }
    }

    /// Parse from database type name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Task" => Some(Self::Task),
            "Assignment" => Some(Self::Assignment),
            "Evaluation" => Some(Self::Evaluation),
            _ => None,
        }
    }
}

/// What the recorded change did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    Created,
    AssignmentsReplaced,
    ProgressRecomputed,
    StatusChanged,
    CollaborationCompleted,
    Deleted,
}

impl JournalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AssignmentsReplaced => "assignments_replaced",
            Self::ProgressRecomputed => "progress_recomputed",
            Self::StatusChanged => "status_changed",
            Self::CollaborationCompleted => "collaboration_completed",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "assignments_replaced" => Some(Self::AssignmentsReplaced),
            "progress_recomputed" => Some(Self::ProgressRecomputed),
            "status_changed" => Some(Self::StatusChanged),
            "collaboration_completed" => Some(Self::CollaborationCompleted),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// A journal entry (audit record)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    /// Journal ID
    pub id: Option<Id>,
    /// Type of the journaled entity
    pub journable_type: JournalType,
    /// ID of the journaled entity
    pub journable_id: Id,
    /// User who made the change
    pub user_id: Id,
    /// What the change did
    pub action: JournalAction,
    /// Notes/summary for this change, shown in the timeline
    pub notes: Option<String>,
    /// Timestamp of the change
    pub created_at: DateTime<Utc>,
}

impl Journal {
    /// Create a new journal entry
    pub fn new(
        journable_type: JournalType,
        journable_id: Id,
        user_id: Id,
        action: JournalAction,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            journable_type,
            journable_id,
            user_id,
            action,
            notes: None,
            created_at,
        }
    }

    /// Set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check if this journal has notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_ref().is_some_and(|n| !n.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_journal_creation() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let journal = Journal::new(JournalType::Task, 1, 10, JournalAction::Created, at);
        assert_eq!(journal.journable_id, 1);
        assert_eq!(journal.user_id, 10);
        assert!(!journal.has_notes());
    }

    #[test]
    fn test_journal_with_notes() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let journal = Journal::new(
            JournalType::Assignment,
            1,
            10,
            JournalAction::AssignmentsReplaced,
            at,
        )
        .with_notes("lead moved from An to Bình");
        assert!(journal.has_notes());
    }

    #[test]
    fn test_type_and_action_round_trip() {
        for t in [
            JournalType::Task,
            JournalType::Assignment,
            JournalType::Evaluation,
        ] {
            assert_eq!(JournalType::parse(t.as_str()), Some(t));
        }
        for a in [
            JournalAction::Created,
            JournalAction::AssignmentsReplaced,
            JournalAction::ProgressRecomputed,
            JournalAction::StatusChanged,
            JournalAction::CollaborationCompleted,
            JournalAction::Deleted,
        ] {
            assert_eq!(JournalAction::parse(a.as_str()), Some(a));
        }
        assert_eq!(JournalType::parse("Unknown"), None);
    }
}
