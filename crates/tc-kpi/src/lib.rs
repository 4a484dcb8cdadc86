//! # tc-kpi
//!
//! The scoring and aggregation kernel: completion scoring, leadership score
//! capping, checklist progress derivation, and KPI period aggregation.
//!
//! Everything in this crate is a pure function over domain values. The one
//! authoritative copy of each formula lives here and is shared by every
//! caller (dashboard, task detail, reports) through `tc-services`.

pub mod aggregate;
pub mod cap;
pub mod progress;
pub mod scoring;

pub use aggregate::{
    aggregate_kpi, trend_window, DepartmentKpi, KpiPeriodAggregate, KpiSourceData, MonthlyKpi,
    StatusCounts, UserKpi,
};
pub use cap::{cap_explanation, max_leadership_score};
pub use progress::{checklist_satisfied, recompute_progress};
pub use scoring::{completion_score, completion_score_for};
