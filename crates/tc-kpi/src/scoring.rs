//! Completion scoring
//!
//! The completion score is a deadline-adherence metric, not a quality metric:
//! pure in status, progress, deadline, and completion time. Early completion
//! scores above 100; work still open past its deadline scores 0.

use chrono::{DateTime, Utc};
use tc_models::{Task, TaskStatus};

/// Compute the completion score for a task.
///
/// Day deltas compare calendar dates (UTC), so finishing any time on the
/// deadline day counts as on time.
///
/// Bands for completed tasks, by `completed_at - deadline` in days:
/// under -7 → 120, -7..-1 → 110, 0 → 100, 1..3 → 90, over 3 → 80.
/// A completed task without a completion timestamp scores 100.
pub fn completion_score(
    status: TaskStatus,
    progress: i32,
    deadline: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i32 {
    match status {
        TaskStatus::Completed => match completed_at {
            Some(completed) => {
                let delta = (completed.date_naive() - deadline.date_naive()).num_days();
                if delta < -7 {
                    120
                } else if delta < 0 {
                    110
                } else if delta == 0 {
                    100
                } else if delta <= 3 {
                    90
                } else {
                    80
                }
            }
            // data inconsistency: completed without a timestamp
            None => 100,
        },
        TaskStatus::InProgress => {
            if now > deadline {
                0
            } else {
                (50.0 + progress.clamp(0, 100) as f64 * 0.5).round() as i32
            }
        }
        TaskStatus::NotStarted => {
            if now > deadline {
                0
            } else {
                30
            }
        }
        TaskStatus::Overdue | TaskStatus::Paused => 0,
    }
}

/// Completion score of a task entity
pub fn completion_score_for(task: &Task, now: DateTime<Utc>) -> i32 {
    completion_score(
        task.status,
        task.progress,
        task.deadline,
        task.completed_at,
        now,
    )
}
