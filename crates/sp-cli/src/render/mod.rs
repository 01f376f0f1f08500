//! Output formats for a finished [`StudyPlan`](sp_core::StudyPlan).

pub mod calendar;
pub mod spreadsheet;

use sp_core::AllocationEntry;

pub use calendar::CalendarStyle;

/// Formats hours without trailing zeros: `4`, `2.5`, `1.25`.
pub fn format_hours(hours: f64) -> String {
    let text = format!("{hours:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Quota left after an entry, e.g. `"6 hours left to study"`.
///
/// `None` for entries without phase data.
pub fn hours_left_text(entry: &AllocationEntry, unit: &str) -> Option<String> {
    let left = entry.hours_left?;
    let phase = entry.hours_type?;
    Some(format!("{} {unit} left to {}", format_hours(left), phase.verb()))
}
