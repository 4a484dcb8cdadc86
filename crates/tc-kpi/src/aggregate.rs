//! KPI period aggregation
//!
//! Aggregates evaluation scores across users, departments, and time periods.
//! Tasks are bucketed by **deadline**, not completion date: a task due in
//! March but finished in April still counts toward March's KPI.
//!
//! Pure over borrowed row sets; `tc-services` fetches the rows and hands
//! them in together with the period and the reference instant.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tc_core::traits::Id;
use tc_models::{Assignment, Department, Evaluation, Task, TaskStatus, User};

/// Row sets the aggregation runs over
#[derive(Debug, Default)]
pub struct KpiSourceData {
    pub tasks: Vec<Task>,
    pub assignments: Vec<Assignment>,
    pub evaluations: Vec<Evaluation>,
    pub users: Vec<User>,
    pub departments: Vec<Department>,
}

/// Per-user KPI row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserKpi {
    pub user_id: Id,
    pub user_name: String,
    pub department_id: Option<Id>,
    /// Mean of the user's evaluation scores in the period, two decimals
    pub average_score: f64,
    /// Distinct evaluated tasks in the period
    pub task_count: i64,
    pub evaluation_count: i64,
}

/// Per-department KPI row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentKpi {
    pub department_id: Id,
    pub department_name: String,
    /// Mean of the department's per-user averages, two decimals
    pub average_score: f64,
    pub user_count: i64,
}

/// One month of the trailing trend series
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyKpi {
    pub year: i32,
    pub month: u32,
    pub average_score: f64,
    pub completed_tasks: i64,
}

/// Task counts by effective (read-derived) status
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub not_started: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
    pub paused: i64,
}

/// The computed KPI aggregate for one period
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiPeriodAggregate {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,

    /// Organization-wide mean of per-user averages, two decimals
    pub average_score: f64,
    /// completed / total over the period's task set, evaluation-independent
    pub completion_rate: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub status_counts: StatusCounts,

    pub users: Vec<UserKpi>,
    pub departments: Vec<DepartmentKpi>,
    /// Ranked by average desc, then task count desc, then name; at most 10
    pub top_performers: Vec<UserKpi>,
    /// Trailing 12 calendar months ending at the reference month,
    /// independent of the requested period and department filter
    pub monthly_trend: Vec<MonthlyKpi>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Per-user accumulation for one window, averages unrounded
struct UserAverage {
    user_id: Id,
    average: f64,
    task_count: i64,
    evaluation_count: i64,
}

/// One window's worth of aggregation, before presentation shaping
struct WindowStats {
    total_tasks: i64,
    completed_tasks: i64,
    status_counts: StatusCounts,
    user_averages: Vec<UserAverage>,
}

fn window_stats(
    data: &KpiSourceData,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> WindowStats {
    let in_window: Vec<&Task> = data
        .tasks
        .iter()
        .filter(|task| !task.deleted && task.deadline >= start && task.deadline < end)
        .collect();

    let mut status_counts = StatusCounts::default();
    let mut completed_ids: HashSet<Id> = HashSet::new();
    for task in &in_window {
        match task.effective_status(now) {
            TaskStatus::NotStarted => status_counts.not_started += 1,
            TaskStatus::InProgress => status_counts.in_progress += 1,
            TaskStatus::Completed => status_counts.completed += 1,
            TaskStatus::Overdue => status_counts.overdue += 1,
            TaskStatus::Paused => status_counts.paused += 1,
        }
        if task.status.is_completed() {
            if let Some(id) = task.id {
                completed_ids.insert(id);
            }
        }
    }

    let assignment_users: HashMap<Id, Id> = data
        .assignments
        .iter()
        .filter_map(|a| a.id.map(|id| (id, a.user_id)))
        .collect();

    // user -> (score sum, evaluation count, distinct tasks)
    let mut accumulators: HashMap<Id, (f64, i64, HashSet<Id>)> = HashMap::new();
    for evaluation in &data.evaluations {
        if !completed_ids.contains(&evaluation.task_id) {
            continue;
        }
        let Some(&user_id) = assignment_users.get(&evaluation.assignment_id) else {
            continue;
        };
        let entry = accumulators
            .entry(user_id)
            .or_insert_with(|| (0.0, 0, HashSet::new()));
        entry.0 += evaluation.score;
        entry.1 += 1;
        entry.2.insert(evaluation.task_id);
    }

    let user_averages = accumulators
        .into_iter()
        .map(|(user_id, (sum, count, tasks))| UserAverage {
            user_id,
            average: sum / count as f64,
            task_count: tasks.len() as i64,
            evaluation_count: count,
        })
        .collect();

    WindowStats {
        total_tasks: in_window.len() as i64,
        completed_tasks: completed_ids.len() as i64,
        status_counts,
        user_averages,
    }
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Trailing 12 calendar months ending at the month of `now`, ascending
fn trailing_months(now: DateTime<Utc>) -> Vec<(i32, u32)> {
    let mut year = now.year();
    let mut month = now.month();
    let mut months = Vec::with_capacity(12);
    for _ in 0..12 {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

/// The `[start, end)` window covering the whole trailing-12-month trend,
/// so callers can fetch one row set wide enough for period and trend alike.
pub fn trend_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let months = trailing_months(now);
    let (first_year, first_month) = months[0];
    let (last_year, last_month) = months[11];
    let (end_year, end_month) = next_month(last_year, last_month);
    (
        month_start(first_year, first_month),
        month_start(end_year, end_month),
    )
}

/// Aggregate KPI statistics for `[period_start, period_end)`.
///
/// `department_filter` narrows the per-user and per-department rows; the
/// organization-wide figures always span the full period task set. A period
/// with no tasks or no evaluations yields zeros and empty lists.
pub fn aggregate_kpi(
    data: &KpiSourceData,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    department_filter: Option<Id>,
    now: DateTime<Utc>,
) -> KpiPeriodAggregate {
    let stats = window_stats(data, period_start, period_end, now);

    let users_by_id: HashMap<Id, &User> = data
        .users
        .iter()
        .filter_map(|u| u.id.map(|id| (id, u)))
        .collect();

    let user_row = |avg: &UserAverage| -> UserKpi {
        let user = users_by_id.get(&avg.user_id);
        UserKpi {
            user_id: avg.user_id,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            department_id: user.and_then(|u| u.department_id),
            average_score: round2(avg.average),
            task_count: avg.task_count,
            evaluation_count: avg.evaluation_count,
        }
    };

    let raw_averages: Vec<f64> = stats.user_averages.iter().map(|a| a.average).collect();
    let average_score = round2(mean(&raw_averages));

    let completion_rate = if stats.total_tasks == 0 {
        0.0
    } else {
        stats.completed_tasks as f64 / stats.total_tasks as f64
    };

    // ranked once, reused for both the user rows and the top-performer list
    let mut ranked: Vec<&UserAverage> = stats.user_averages.iter().collect();
    ranked.sort_by(|a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| b.task_count.cmp(&a.task_count))
            .then_with(|| {
                let name_a = users_by_id.get(&a.user_id).map(|u| u.name.as_str());
                let name_b = users_by_id.get(&b.user_id).map(|u| u.name.as_str());
                name_a.cmp(&name_b)
            })
    });

    let top_performers: Vec<UserKpi> = ranked.iter().take(10).map(|a| user_row(a)).collect();

    let users: Vec<UserKpi> = ranked
        .iter()
        .map(|a| user_row(a))
        .filter(|row| match department_filter {
            Some(dept) => row.department_id == Some(dept),
            None => true,
        })
        .collect();

    let departments: Vec<DepartmentKpi> = data
        .departments
        .iter()
        .filter_map(|dept| {
            let dept_id = dept.id?;
            if department_filter.is_some_and(|filter| filter != dept_id) {
                return None;
            }
            let member_averages: Vec<f64> = stats
                .user_averages
                .iter()
                .filter(|a| {
                    users_by_id
                        .get(&a.user_id)
                        .is_some_and(|u| u.department_id == Some(dept_id))
                })
                .map(|a| a.average)
                .collect();
            Some(DepartmentKpi {
                department_id: dept_id,
                department_name: dept.name.clone(),
                average_score: round2(mean(&member_averages)),
                user_count: member_averages.len() as i64,
            })
        })
        .collect();

    let monthly_trend = trailing_months(now)
        .into_iter()
        .map(|(year, month)| {
            let start = month_start(year, month);
            let (end_year, end_month) = next_month(year, month);
            let end = month_start(end_year, end_month);
            let month_stats = window_stats(data, start, end, now);
            let averages: Vec<f64> = month_stats.user_averages.iter().map(|a| a.average).collect();
            MonthlyKpi {
                year,
                month,
                average_score: round2(mean(&averages)),
                completed_tasks: month_stats.completed_tasks,
            }
        })
        .collect();

    KpiPeriodAggregate {
        period_start,
        period_end,
        average_score,
        completion_rate,
        total_tasks: stats.total_tasks,
        completed_tasks: stats.completed_tasks,
        status_counts: stats.status_counts,
        users,
        departments,
        top_performers,
        monthly_trend,
    }
}
