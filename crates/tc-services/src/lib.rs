//! # tc-services
//!
//! Business logic services for TaskCenter RS.
//!
//! Each operation of the core lives here as a service struct: it gates the
//! call (not-found, state, permission, validation — in that order), delegates
//! formulas to `tc-kpi`, persists through the storage ports in [`stores`],
//! and records observable changes in the audit journal.

pub mod assignments;
pub mod evaluations;
pub mod kpi;
pub mod stores;
pub mod tasks;

mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use assignments::{
    drafts_with_new_lead, CollaborationCompletionService, ReplaceAssignmentsService,
};
pub use evaluations::{ListEvaluationsService, SubmitEvaluationService};
pub use kpi::KpiStatisticsService;
pub use stores::{
    AssignmentStore, ChecklistStore, EvaluationAuthorizer, EvaluationFilter, EvaluationStore,
    KpiSource, TaskStore, UserDirectory,
};
pub use tasks::{
    CreateTaskService, MarkCompletedService, RecomputeProgressService, SoftDeleteTaskService,
};
