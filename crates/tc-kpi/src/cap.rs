//! Leadership score capping
//!
//! Bounds the human-assigned 0-10 evaluation score by the objective
//! completion score, so a high subjective score cannot be awarded to
//! objectively late or incomplete work. The cap is enforced at submission
//! with an explicit error, never silently clamped.

/// Maximum leadership score allowed for a completion score.
///
/// Evaluated top-down, first match wins. Monotonically non-decreasing in the
/// completion score; always one of {1, 2, 4, 6, 8, 10}.
pub fn max_leadership_score(completion_score: i32) -> i32 {
    if completion_score >= 110 {
        10
    } else if completion_score >= 100 {
        8
    } else if completion_score >= 90 {
        6
    } else if completion_score >= 80 {
        4
    } else if completion_score > 0 {
        2
    } else {
        1
    }
}

/// Human-readable justification for the cap, included in rejection payloads
/// and shown next to the score input.
pub fn cap_explanation(completion_score: i32) -> &'static str {
    if completion_score >= 110 {
        "task was completed at least one day early"
    } else if completion_score >= 100 {
        "task was completed on time"
    } else if completion_score >= 90 {
        "task was completed 1-3 days late"
    } else if completion_score >= 80 {
        "task was completed more than 3 days late"
    } else if completion_score > 0 {
        "task is still in progress and behind schedule"
    } else {
        "task is overdue and was never started"
    }
}
