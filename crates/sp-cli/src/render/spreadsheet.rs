//! Spreadsheet export: one row per plan entry.

use rust_xlsxwriter::{Format, FormatBorder, Workbook, XlsxError};
use sp_core::{DATE_FORMAT, StudyPlan};

use super::hours_left_text;

const HEADERS: [&str; 6] = [
    "Date",
    "Module",
    "Hours",
    "Days to Deadline",
    "Day Type",
    "Hours Left",
];
const WIDTHS: [f64; 6] = [12.0, 40.0, 8.0, 17.0, 10.0, 26.0];

/// Renders the plan as XLSX bytes.
///
/// Days without entries produce no rows. The Hours Left column stays blank
/// for entries without phase data.
pub fn render(plan: &StudyPlan) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let cell = Format::new().set_border(FormatBorder::Thin);
    let number = Format::new()
        .set_num_format("0.##")
        .set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name("Study Plan")?;

    for (col, (title, width)) in (0u16..).zip(HEADERS.iter().zip(WIDTHS)) {
        sheet.write_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for (row, (date, entry)) in (1u32..).zip(plan.entries()) {
        sheet.write_with_format(row, 0, date.format(DATE_FORMAT).to_string(), &cell)?;
        sheet.write_with_format(row, 1, &entry.module, &cell)?;
        sheet.write_with_format(row, 2, entry.hours, &number)?;
        #[expect(
            clippy::cast_precision_loss,
            reason = "day counts are far below f64 precision limits"
        )]
        let days_to_deadline = entry.days_to_deadline as f64;
        sheet.write_with_format(row, 3, days_to_deadline, &number)?;
        sheet.write_with_format(row, 4, capitalize(entry.day_type.as_str()), &cell)?;
        let left = hours_left_text(entry, "hours").unwrap_or_default();
        sheet.write_with_format(row, 5, left, &cell)?;
    }

    workbook.save_to_buffer()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sp_core::{AllocationEntry, DayKind, Phase};

    fn sample_plan() -> StudyPlan {
        let date = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();
        let mut plan = StudyPlan::default();
        plan.days.insert(
            date,
            vec![AllocationEntry {
                assignment_id: 1,
                module: "Maths - Essay (Study)".to_string(),
                hours: 4.0,
                days_to_deadline: 14,
                day_type: DayKind::Regular,
                hours_left: Some(6.0),
                hours_type: Some(Phase::Study),
                original_study_hours: 10.0,
                original_submission_hours: 2.0,
            }],
        );
        plan
    }

    #[test]
    fn produces_xlsx_archive() {
        let bytes = render(&sample_plan()).unwrap();
        // XLSX files are ZIP archives
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn empty_plan_still_has_header_sheet() {
        let bytes = render(&StudyPlan::default()).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn day_type_is_capitalized() {
        assert_eq!(capitalize("regular"), "Regular");
        assert_eq!(capitalize("leave"), "Leave");
        assert_eq!(capitalize(""), "");
    }
}
