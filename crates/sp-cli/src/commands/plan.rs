//! `sp plan`: build the study plan from stored data and print it.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use sp_core::{ForcedOverflowReason, PlanInput, SkipReason, StudyPlan, build_study_plan};
use sp_db::Database;

use crate::render::{format_hours, hours_left_text};

/// The given date, or the local date when absent.
pub fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Loads everything from the database and runs the planner.
///
/// Fails when no modules exist.
pub fn build(db: &Database, today: NaiveDate) -> Result<StudyPlan> {
    let modules = db.list_modules()?;
    if modules.is_empty() {
        bail!("No data to export");
    }
    let assignments = db.list_assignments()?;
    let settings = db.load_settings()?;
    settings
        .validate()
        .context("stored study settings are invalid")?;
    let holidays = db.list_holidays()?;

    let input = PlanInput {
        modules: &modules,
        assignments: &assignments,
        settings: &settings,
        holidays: &holidays,
    };
    Ok(build_study_plan(&input, today))
}

pub fn run<W: Write>(writer: &mut W, db: &Database, today: NaiveDate, json: bool) -> Result<()> {
    let plan = build(db, today)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&plan)?)?;
    } else {
        write_table(writer, &plan)?;
    }
    Ok(())
}

/// Human-readable plan: one line per entry, then forced placements and skips.
pub fn write_table<W: Write>(writer: &mut W, plan: &StudyPlan) -> io::Result<()> {
    if plan.is_empty() {
        writeln!(writer, "Nothing to plan. Add assignments with due dates.")?;
    } else {
        writeln!(
            writer,
            "{:<10}  {:<7}  {:>5}  {:>6}  Task",
            "Date", "Day", "Hours", "Due in"
        )?;
        writeln!(
            writer,
            "──────────  ───────  ─────  ──────  ──────────────────────────────"
        )?;
        for (date, entry) in plan.entries() {
            let left = hours_left_text(entry, "hours")
                .map(|text| format!(" ({text})"))
                .unwrap_or_default();
            let due_in = format!("{}d", entry.days_to_deadline);
            writeln!(
                writer,
                "{:<10}  {:<7}  {:>5}  {:>6}  {}{left}",
                date.to_string(),
                entry.day_type.as_str(),
                format_hours(entry.hours),
                due_in,
                entry.module,
            )?;
        }
    }

    if !plan.forced.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Placed over capacity:")?;
        for forced in &plan.forced {
            let reason = match forced.reason {
                ForcedOverflowReason::CapacityExhausted => "no free capacity before the cutoff",
                ForcedOverflowReason::LastStudyDay => "added to the last study day",
                ForcedOverflowReason::NoEligibleDay => "cutoff already passed",
            };
            writeln!(
                writer,
                "  {}  {} h  assignment {} {}: {reason}",
                forced.date,
                format_hours(forced.hours),
                forced.assignment_id,
                forced.phase,
            )?;
        }
    }

    if !plan.skipped.is_empty() {
        writeln!(writer)?;
        for skipped in &plan.skipped {
            match skipped.reason {
                SkipReason::UnknownModule { module_id } => writeln!(
                    writer,
                    "Skipped assignment {}: module {module_id} not found",
                    skipped.assignment_id
                )?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use insta::assert_snapshot;
    use sp_core::{Assignment, Module, StudySettings};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.save_module(&Module::new(1, "Maths", 5.0, 2).unwrap())
            .unwrap();
        db.save_assignment(&Assignment::new(1, 1, "Essay", date(2025, 3, 10), 10.0, 2.0).unwrap())
            .unwrap();
        let settings = StudySettings::default()
            .with_study_day(Weekday::Mon, 4)
            .with_study_day(Weekday::Wed, 4)
            .with_study_day(Weekday::Fri, 4);
        db.save_settings(&settings).unwrap();
        db
    }

    fn run_table(db: &Database, today: NaiveDate) -> String {
        let mut output = Vec::new();
        run(&mut output, db, today, false).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn no_modules_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let err = build(&db, date(2025, 2, 24)).unwrap_err();
        assert_eq!(err.to_string(), "No data to export");
    }

    #[test]
    fn table_for_single_assignment() {
        let db = seeded_db();
        assert_snapshot!(run_table(&db, date(2025, 2, 24)), @r"
        Date        Day      Hours  Due in  Task
        ──────────  ───────  ─────  ──────  ──────────────────────────────
        2025-02-24  regular      4     14d  Maths - Essay (Study) (6 hours left to study)
        2025-02-26  regular      4     12d  Maths - Essay (Study) (2 hours left to study)
        2025-02-28  regular      2     10d  Maths - Essay (Study) (0 hours left to study)
        2025-03-03  regular      2      7d  Maths - Essay (Submission) (0 hours left to submit)
        ");
    }

    #[test]
    fn table_reports_forced_placements() {
        let db = seeded_db();
        // The submission cutoff (2025-03-08) is already behind us.
        assert_snapshot!(run_table(&db, date(2025, 3, 9)), @r"
        Date        Day      Hours  Due in  Task
        ──────────  ───────  ─────  ──────  ──────────────────────────────
        2025-03-09  regular     10      1d  Maths - Essay (Study) (0 hours left to study)
        2025-03-09  regular      2      1d  Maths - Essay (Submission) (0 hours left to submit)

        Placed over capacity:
          2025-03-09  10 h  assignment 1 Study: cutoff already passed
          2025-03-09  2 h  assignment 1 Submission: cutoff already passed
        ");
    }

    #[test]
    fn json_output_parses_back() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, date(2025, 2, 24), true).unwrap();

        let plan: StudyPlan = serde_json::from_slice(&output).unwrap();
        assert_eq!(plan.entries().count(), 4);
        assert!(plan.forced.is_empty());
    }

    #[test]
    fn legacy_modules_plan_without_assignments() {
        let db = Database::open_in_memory().unwrap();
        let module = Module::new(1, "History", 2.0, 2)
            .unwrap()
            .with_legacy_deadline(date(2025, 3, 10), 3);
        db.save_module(&module).unwrap();

        let plan = build(&db, date(2025, 2, 24)).unwrap();

        // No study days configured: everything is forced onto the window start.
        let placed: Vec<_> = plan.entries().map(|(d, e)| (d, e.hours)).collect();
        assert_eq!(placed, vec![(date(2025, 2, 24), 6.0)]);
        assert!(plan.entries().all(|(_, e)| e.hours_type.is_none()));
    }
}
