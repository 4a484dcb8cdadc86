//! # tc-db
//!
//! Database layer for TaskCenter RS.
//!
//! This crate provides PostgreSQL access using SQLx, including:
//!
//! - Connection pool management
//! - Repository structs per table, implementing the `tc-services` storage
//!   ports
//! - Atomic per-year task-number allocation
//! - The unique-key evaluation upsert and the transactional assignment
//!   replace required by the concurrency policy
//!
//! ## Example
//!
//! ```ignore
//! use tc_db::{Database, DatabaseConfig, TaskRepository};
//!
//! let config = DatabaseConfig::from_env();
//! let db = Database::connect(&config).await?;
//! let tasks = TaskRepository::new(db.pool().clone());
//! let task = tasks.find_by_id(1).await?;
//! ```

pub mod assignments;
pub mod checklist_items;
pub mod evaluations;
pub mod journals;
pub mod kpi;
pub mod pool;
pub mod repository;
pub mod tasks;
pub mod users;

// Re-exports
pub use assignments::{AssignmentRepository, AssignmentRow};
pub use checklist_items::{ChecklistItemRepository, ChecklistItemRow};
pub use evaluations::{EvaluationRepository, EvaluationRow};
pub use journals::{JournalRepository, JournalRow};
pub use kpi::KpiQueryExecutor;
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use repository::{RepositoryError, RepositoryResult};
pub use tasks::{TaskRepository, TaskRow};
pub use users::{DepartmentRow, UserRepository, UserRow};
