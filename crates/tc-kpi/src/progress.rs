//! Checklist-driven progress derivation
//!
//! Progress recomputation is automatic on every checklist toggle; the
//! transition to Completed is a separate explicit action handled by the
//! service layer, so a finished checklist never silently completes a task.

use tc_models::ChecklistItem;

/// Derived progress: `round(100 × completed / total)` when at least one item
/// exists, `None` otherwise (progress stays as manually set).
pub fn recompute_progress(items: &[ChecklistItem]) -> Option<i32> {
    if items.is_empty() {
        return None;
    }
    let completed = items.iter().filter(|item| item.completed).count();
    Some((100.0 * completed as f64 / items.len() as f64).round() as i32)
}

/// Whether the checklist permits the explicit transition to Completed:
/// at least one item and all of them done.
pub fn checklist_satisfied(items: &[ChecklistItem]) -> bool {
    !items.is_empty() && items.iter().all(|item| item.completed)
}
