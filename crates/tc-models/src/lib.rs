//! # tc-models
//!
//! Domain models for TaskCenter RS.
//!
//! This crate contains the entity structs that map to the platform's database
//! tables. Each model implements the core traits from `tc-core` (Entity,
//! Identifiable, etc.)

pub use tc_core::traits::{Auditable, Entity, Id, Identifiable, SoftDeletable, Timestamped};

// Core domain modules
pub mod assignment;
pub mod checklist;
pub mod evaluation;
pub mod task;
pub mod task_number;
pub mod user;

// Re-exports for convenience
pub use assignment::{validate_assignment_set, Assignment, AssignmentDraft, AssignmentRole};
pub use checklist::ChecklistItem;
pub use evaluation::{Evaluation, SubmitEvaluationDto};
pub use task::{CreateTaskDto, Task, TaskPriority, TaskStatus};
pub use task_number::TaskNumber;
pub use user::{Department, User};
