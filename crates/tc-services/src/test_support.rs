//! In-memory implementations of the storage ports for service tests

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tc_core::error::TcError;
use tc_core::result::TcResult;
use tc_core::traits::{Id, UserContext};
use tc_kpi::KpiSourceData;
use tc_models::{
    Assignment, AssignmentDraft, ChecklistItem, Department, Evaluation, Task, TaskNumber,
    TaskStatus, User,
};

use crate::stores::{
    AssignmentStore, ChecklistStore, EvaluationAuthorizer, EvaluationFilter, EvaluationStore,
    KpiSource, TaskStore, UserDirectory,
};

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    assignments: Vec<Assignment>,
    evaluations: Vec<Evaluation>,
    items: Vec<ChecklistItem>,
    users: Vec<User>,
    departments: Vec<Department>,
    next_id: Id,
    sequences: HashMap<i32, u32>,
}

/// One backend implementing every port against shared in-memory state
#[derive(Default)]
pub struct MemBackend {
    state: Mutex<State>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("test state poisoned")
    }

    fn next_id(state: &mut State) -> Id {
        state.next_id += 1;
        state.next_id
    }

    pub fn add_task(&self, configure: impl FnOnce(&mut Task)) -> Id {
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let mut task = Task::new(format!("task {}", id), DateTime::<Utc>::UNIX_EPOCH);
        configure(&mut task);
        task.id = Some(id);
        state.tasks.push(task);
        id
    }

    pub fn update_task(&self, id: Id, configure: impl FnOnce(&mut Task)) {
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .expect("unknown task in test setup");
        configure(task);
    }

    pub fn find_task_sync(&self, id: Id) -> Task {
        self.lock()
            .tasks
            .iter()
            .find(|t| t.id == Some(id))
            .cloned()
            .expect("unknown task in test setup")
    }

    pub fn add_assignment(&self, task_id: Id, user_id: Id, role: tc_models::AssignmentRole) -> Id {
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let mut assignment = Assignment::new(task_id, user_id, role);
        assignment.id = Some(id);
        state.assignments.push(assignment);
        id
    }

    pub fn add_evaluation(&self, task_id: Id, assignment_id: Id, evaluator_id: Id, score: f64) {
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let mut evaluation = Evaluation::new(task_id, assignment_id, evaluator_id, score);
        evaluation.id = Some(id);
        state.evaluations.push(evaluation);
    }

    pub fn add_checklist_item(&self, task_id: Id, title: &str) -> Id {
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let position = state.items.iter().filter(|i| i.task_id == task_id).count() as i32;
        let mut item = ChecklistItem::new(task_id, title, position);
        item.id = Some(id);
        state.items.push(item);
        id
    }

    pub fn set_item(&self, item_id: Id, completed: bool) {
        let mut state = self.lock();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == Some(item_id))
            .expect("unknown checklist item in test setup");
        item.completed = completed;
    }

    pub fn add_user(&self, id: Id, name: &str, department_id: Option<Id>, top_leadership: bool) {
        let mut state = self.lock();
        let mut user = User::new(name, format!("login{}", id));
        user.id = Some(id);
        user.department_id = department_id;
        user.top_leadership = top_leadership;
        state.users.push(user);
    }

    pub fn add_department(&self, id: Id, name: &str) {
        let mut state = self.lock();
        let mut department = Department::new(name);
        department.id = Some(id);
        state.departments.push(department);
    }
}

#[async_trait]
impl TaskStore for MemBackend {
    async fn find_task(&self, id: Id) -> TcResult<Option<Task>> {
        Ok(self.lock().tasks.iter().find(|t| t.id == Some(id)).cloned())
    }

    async fn create_task(&self, mut task: Task) -> TcResult<Task> {
        let mut state = self.lock();
        let id = Self::next_id(&mut state);
        let year = task
            .created_at
            .unwrap_or(task.deadline)
            .year();
        let sequence = state.sequences.entry(year).or_insert(0);
        *sequence += 1;
        task.id = Some(id);
        task.task_number = TaskNumber::for_year(year, *sequence);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_progress(
        &self,
        id: Id,
        progress: i32,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task> {
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| TcError::not_found("Task", "id", id))?;
        task.progress = progress;
        task.updated_at = Some(updated_at);
        Ok(task.clone())
    }

    async fn update_status(
        &self,
        id: Id,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Task> {
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| TcError::not_found("Task", "id", id))?;
        task.status = status;
        task.completed_at = completed_at;
        task.updated_at = Some(updated_at);
        Ok(task.clone())
    }

    async fn soft_delete(&self, id: Id, actor_id: Id, at: DateTime<Utc>) -> TcResult<()> {
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| TcError::not_found("Task", "id", id))?;
        task.deleted = true;
        task.deleted_at = Some(at);
        task.deleted_by_id = Some(actor_id);
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for MemBackend {
    async fn find_assignment(&self, id: Id) -> TcResult<Option<Assignment>> {
        Ok(self
            .lock()
            .assignments
            .iter()
            .find(|a| a.id == Some(id))
            .cloned())
    }

    async fn assignments_for_task(&self, task_id: Id) -> TcResult<Vec<Assignment>> {
        Ok(self
            .lock()
            .assignments
            .iter()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn replace_for_task(
        &self,
        task_id: Id,
        drafts: &[AssignmentDraft],
    ) -> TcResult<Vec<Assignment>> {
        let mut state = self.lock();
        state.assignments.retain(|a| a.task_id != task_id);
        let mut replaced = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = Self::next_id(&mut state);
            let mut assignment = Assignment::new(task_id, draft.user_id, draft.role);
            assignment.id = Some(id);
            state.assignments.push(assignment.clone());
            replaced.push(assignment);
        }
        Ok(replaced)
    }

    async fn set_collaboration_completed(
        &self,
        assignment_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<Assignment> {
        let mut state = self.lock();
        let assignment = state
            .assignments
            .iter_mut()
            .find(|a| a.id == Some(assignment_id))
            .ok_or_else(|| TcError::not_found("Assignment", "id", assignment_id))?;
        assignment.collaboration_completed = completed;
        assignment.updated_at = Some(updated_at);
        Ok(assignment.clone())
    }
}

#[async_trait]
impl EvaluationStore for MemBackend {
    async fn upsert(&self, evaluation: Evaluation) -> TcResult<Evaluation> {
        let mut state = self.lock();
        if let Some(existing) = state.evaluations.iter_mut().find(|e| {
            e.task_id == evaluation.task_id && e.assignment_id == evaluation.assignment_id
        }) {
            let id = existing.id;
            *existing = evaluation;
            existing.id = id;
            return Ok(existing.clone());
        }
        let id = Self::next_id(&mut state);
        let mut stored = evaluation;
        stored.id = Some(id);
        state.evaluations.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, filter: &EvaluationFilter) -> TcResult<Vec<Evaluation>> {
        Ok(self
            .lock()
            .evaluations
            .iter()
            .filter(|e| filter.task_id.map_or(true, |id| e.task_id == id))
            .filter(|e| filter.evaluator_id.map_or(true, |id| e.evaluator_id == id))
            .cloned()
            .collect())
    }

    async fn any_for_task(&self, task_id: Id) -> TcResult<bool> {
        Ok(self
            .lock()
            .evaluations
            .iter()
            .any(|e| e.task_id == task_id))
    }

    async fn unevaluated_assignments(&self, task_id: Option<Id>) -> TcResult<Vec<Assignment>> {
        let state = self.lock();
        Ok(state
            .assignments
            .iter()
            .filter(|a| task_id.map_or(true, |id| a.task_id == id))
            .filter(|a| {
                state
                    .tasks
                    .iter()
                    .any(|t| t.id == Some(a.task_id) && t.status.is_completed())
            })
            .filter(|a| {
                !state
                    .evaluations
                    .iter()
                    .any(|e| Some(e.assignment_id) == a.id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChecklistStore for MemBackend {
    async fn items_for_task(&self, task_id: Id) -> TcResult<Vec<ChecklistItem>> {
        let mut items: Vec<ChecklistItem> = self
            .lock()
            .items
            .iter()
            .filter(|i| i.task_id == task_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.position);
        Ok(items)
    }

    async fn set_item_completed(
        &self,
        item_id: Id,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> TcResult<ChecklistItem> {
        let mut state = self.lock();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == Some(item_id))
            .ok_or_else(|| TcError::not_found("ChecklistItem", "id", item_id))?;
        item.completed = completed;
        item.updated_at = Some(updated_at);
        Ok(item.clone())
    }
}

#[async_trait]
impl UserDirectory for MemBackend {
    async fn find_user(&self, id: Id) -> TcResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn users(&self) -> TcResult<Vec<User>> {
        Ok(self.lock().users.clone())
    }

    async fn departments(&self) -> TcResult<Vec<Department>> {
        Ok(self.lock().departments.clone())
    }
}

#[async_trait]
impl KpiSource for MemBackend {
    async fn kpi_rows(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TcResult<KpiSourceData> {
        let state = self.lock();
        Ok(KpiSourceData {
            tasks: state
                .tasks
                .iter()
                .filter(|t| t.deadline >= start && t.deadline < end)
                .cloned()
                .collect(),
            assignments: state.assignments.clone(),
            evaluations: state.evaluations.clone(),
            users: state.users.clone(),
            departments: state.departments.clone(),
        })
    }
}

/// Authorizer backed by an explicit assignment -> evaluator map
#[derive(Default)]
pub struct MapAuthorizer {
    allowed: HashMap<Id, Id>,
}

impl MapAuthorizer {
    pub fn allowing(assignment_id: Id, evaluator_id: Id) -> Self {
        let mut allowed = HashMap::new();
        allowed.insert(assignment_id, evaluator_id);
        Self { allowed }
    }
}

#[async_trait]
impl EvaluationAuthorizer for MapAuthorizer {
    async fn is_authorized(
        &self,
        evaluator_id: Id,
        _task: &Task,
        assignment: &Assignment,
    ) -> TcResult<bool> {
        Ok(assignment
            .id
            .and_then(|id| self.allowed.get(&id))
            .is_some_and(|&allowed| allowed == evaluator_id))
    }
}

/// Simple caller context for permission checks in tests
pub struct Caller {
    id: Id,
    admin: bool,
}

impl Caller {
    pub fn admin(id: Id) -> Self {
        Self { id, admin: true }
    }

    pub fn user(id: Id) -> Self {
        Self { id, admin: false }
    }
}

impl UserContext for Caller {
    fn id(&self) -> Id {
        self.id
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn department_id(&self) -> Option<Id> {
        None
    }

    fn holds_top_leadership_role(&self) -> bool {
        false
    }
}
