//! Journal service
//!
//! Creating and querying audit entries. The services crate calls the
//! `record_*` helpers at each observable state change.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tc_core::error::TcError;
use tc_core::result::TcResult;
use tc_core::traits::Id;

use crate::journal::{Journal, JournalAction, JournalType};

/// Journal store trait for persistence
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Append a new journal entry
    async fn append(&self, journal: &Journal) -> TcResult<Id>;

    /// Get all journals for an entity, oldest first
    async fn for_entity(
        &self,
        journable_type: JournalType,
        journable_id: Id,
    ) -> TcResult<Vec<Journal>>;
}

/// Journal service for recording audit entries
pub struct JournalService {
    store: Arc<dyn JournalStore>,
}

impl JournalService {
    pub fn new(store: Arc<dyn JournalStore>) -> Self {
        Self { store }
    }

    /// Record task creation
    pub async fn record_task_created(
        &self,
        task_id: Id,
        user_id: Id,
        summary: impl Into<String>,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(JournalType::Task, task_id, user_id, JournalAction::Created, at)
            .with_notes(summary);
        self.append(journal).await
    }

    /// Record task soft deletion
    pub async fn record_task_deleted(
        &self,
        task_id: Id,
        user_id: Id,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(JournalType::Task, task_id, user_id, JournalAction::Deleted, at);
        self.append(journal).await
    }

    /// Record a full assignment-set replacement on a task
    pub async fn record_assignments_replaced(
        &self,
        task_id: Id,
        user_id: Id,
        summary: impl Into<String>,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(
            JournalType::Task,
            task_id,
            user_id,
            JournalAction::AssignmentsReplaced,
            at,
        )
        .with_notes(summary);
        self.append(journal).await
    }

    /// Record a checklist-driven progress recomputation
    pub async fn record_progress_update(
        &self,
        task_id: Id,
        user_id: Id,
        old_progress: i32,
        new_progress: i32,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(
            JournalType::Task,
            task_id,
            user_id,
            JournalAction::ProgressRecomputed,
            at,
        )
        .with_notes(format!("progress {} -> {}", old_progress, new_progress));
        self.append(journal).await
    }

    /// Record an explicit status change
    pub async fn record_status_change(
        &self,
        task_id: Id,
        user_id: Id,
        summary: impl Into<String>,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(
            JournalType::Task,
            task_id,
            user_id,
            JournalAction::StatusChanged,
            at,
        )
        .with_notes(summary);
        self.append(journal).await
    }

    /// Record a collaborator marking their contribution done
    pub async fn record_collaboration_completed(
        &self,
        assignment_id: Id,
        user_id: Id,
        at: DateTime<Utc>,
    ) -> TcResult<Id> {
        let journal = Journal::new(
            JournalType::Assignment,
            assignment_id,
            user_id,
            JournalAction::CollaborationCompleted,
            at,
        );
        self.append(journal).await
    }

    /// Timeline for a task, oldest first
    pub async fn task_timeline(&self, task_id: Id) -> TcResult<Vec<Journal>> {
        self.store.for_entity(JournalType::Task, task_id).await
    }

    async fn append(&self, mut journal: Journal) -> TcResult<Id> {
        let id = self.store.append(&journal).await?;
        journal.id = Some(id);
        tracing::debug!(
            journable_type = journal.journable_type.as_str(),
            journable_id = journal.journable_id,
            action = journal.action.as_str(),
            "journal entry recorded"
        );
        Ok(id)
    }
}

/// In-memory journal store, used by tests and as a null sink
#[derive(Default)]
pub struct InMemoryJournalStore {
    entries: std::sync::Mutex<Vec<Journal>>,
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Journal> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl JournalStore for InMemoryJournalStore {
    async fn append(&self, journal: &Journal) -> TcResult<Id> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TcError::Internal("journal store poisoned".into()))?;
        let id = entries.len() as Id + 1;
        let mut stored = journal.clone();
        stored.id = Some(id);
        entries.push(stored);
        Ok(id)
    }

    async fn for_entity(
        &self,
        journable_type: JournalType,
        journable_id: Id,
    ) -> TcResult<Vec<Journal>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TcError::Internal("journal store poisoned".into()))?;
        Ok(entries
            .iter()
            .filter(|j| j.journable_type == journable_type && j.journable_id == journable_id)
            .cloned()
            .collect())
    }
}
