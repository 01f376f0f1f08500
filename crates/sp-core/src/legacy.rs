//! Compatibility for module-only records.
//!
//! Older data has no assignments; each module instead carries a due date and
//! an assignment count. Such modules are turned into one synthetic assignment
//! each, planned by the regular distributor, and the resulting entries are
//! reshaped to the older output: labelled by module name, without phase data.

use crate::allocation::StudyPlan;
use crate::types::{Assignment, Module};

/// Builds one synthetic assignment per module that has a legacy due date.
///
/// Study hours are `assignments * hours_required` (one assignment when the
/// count is missing). Modules without a due date are left out.
pub fn synthetic_assignments(modules: &[Module]) -> Vec<Assignment> {
    modules
        .iter()
        .filter_map(|module| {
            let due_date = module.due_date?;
            let count = module.assignments.unwrap_or(1);
            Some(Assignment {
                id: module.id,
                module_id: module.id,
                name: module.name.clone(),
                due_date,
                study_hours: f64::from(count) * module.hours_required,
                submission_hours: 0.0,
            })
        })
        .collect()
}

/// Reshapes a plan built from [`synthetic_assignments`] into the legacy form.
pub fn into_legacy_plan(mut plan: StudyPlan, modules: &[Module]) -> StudyPlan {
    for entries in plan.days.values_mut() {
        for entry in entries.iter_mut() {
            if let Some(module) = modules.iter().find(|m| m.id == entry.assignment_id) {
                entry.module.clone_from(&module.name);
            }
            entry.hours_left = None;
            entry.hours_type = None;
        }
    }
    plan.days.retain(|_, entries| !entries.is_empty());
    plan
}
