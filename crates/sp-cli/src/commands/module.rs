//! `sp module` commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use sp_core::Module;
use sp_db::Database;

use super::truncate;
use crate::ModuleArgs;
use crate::render::format_hours;

/// Adds a module, or replaces the one named by `--id`.
pub fn add<W: Write>(writer: &mut W, db: &Database, args: &ModuleArgs) -> Result<Module> {
    let id = match args.id {
        Some(id) => {
            if db.get_module(id)?.is_none() {
                bail!("module {id} does not exist");
            }
            id
        }
        None => db.next_module_id()?,
    };

    let mut module = Module::new(id, args.name.trim(), args.hours, args.days_before)?;
    if let Some(due) = args.due {
        module = module.with_legacy_deadline(due, args.assignments.unwrap_or(1));
        module.validate()?;
    }
    db.save_module(&module).context("failed to save module")?;
    tracing::debug!(id, name = %module.name, "module saved");

    writeln!(writer, "Saved module {id}: {}", module.name)?;
    Ok(module)
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let modules = db.list_modules()?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&modules)?)?;
        return Ok(());
    }

    if modules.is_empty() {
        writeln!(writer, "No modules.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'sp module add <name> --hours <h>' to add one."
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<4}  {:<24}  {:>6}  {:>11}  Legacy due",
        "ID", "Name", "Hours", "Days before"
    )?;
    writeln!(
        writer,
        "────  ────────────────────────  ──────  ───────────  ──────────────"
    )?;
    for module in &modules {
        let legacy = module
            .due_date
            .map(|due| format!("{due} x{}", module.assignments.unwrap_or(1)))
            .unwrap_or_default();
        let line = format!(
            "{:<4}  {:<24}  {:>6}  {:>11}  {legacy}",
            module.id,
            truncate(&module.name, 24),
            format_hours(module.hours_required),
            module.days_before,
        );
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &Database, id: i64) -> Result<()> {
    if !db.delete_module(id)? {
        bail!("module {id} does not exist");
    }
    writeln!(writer, "Removed module {id} and its assignments")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insta::assert_snapshot;

    fn args(name: &str, hours: f64) -> ModuleArgs {
        ModuleArgs {
            name: name.to_string(),
            hours,
            days_before: 2,
            due: None,
            assignments: None,
            id: None,
        }
    }

    fn run_list(db: &Database) -> String {
        let mut output = Vec::new();
        list(&mut output, db, false).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn add_assigns_next_id() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();

        add(&mut output, &db, &args("Maths", 5.0)).unwrap();
        let second = add(&mut output, &db, &args("Physics", 4.0)).unwrap();

        assert_eq!(second.id, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Saved module 1: Maths\nSaved module 2: Physics\n"
        );
    }

    #[test]
    fn add_rejects_low_hours() {
        let db = Database::open_in_memory().unwrap();
        let result = add(&mut Vec::new(), &db, &args("Maths", 0.25));
        assert!(result.is_err());
        assert!(db.list_modules().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_lead_time_over_a_year() {
        let db = Database::open_in_memory().unwrap();
        let mut long_lead = args("Maths", 5.0);
        long_lead.days_before = 100_000_000;

        let err = add(&mut Vec::new(), &db, &long_lead).unwrap_err();

        assert!(err.to_string().contains("at most 365"), "{err}");
        assert!(db.list_modules().unwrap().is_empty());
    }

    #[test]
    fn add_with_unknown_id_fails() {
        let db = Database::open_in_memory().unwrap();
        let mut replacement = args("Maths", 5.0);
        replacement.id = Some(9);

        let err = add(&mut Vec::new(), &db, &replacement).unwrap_err();
        assert_eq!(err.to_string(), "module 9 does not exist");
    }

    #[test]
    fn list_empty() {
        let db = Database::open_in_memory().unwrap();
        assert_snapshot!(run_list(&db), @r"
        No modules.

        Hint: Run 'sp module add <name> --hours <h>' to add one.
        ");
    }

    #[test]
    fn list_shows_legacy_deadline() {
        let db = Database::open_in_memory().unwrap();
        add(&mut Vec::new(), &db, &args("Maths", 5.0)).unwrap();
        let mut legacy = args("History of the Modern World", 2.5);
        legacy.due = NaiveDate::from_ymd_opt(2025, 3, 10);
        legacy.assignments = Some(3);
        add(&mut Vec::new(), &db, &legacy).unwrap();

        assert_snapshot!(run_list(&db), @r"
        ID    Name                       Hours  Days before  Legacy due
        ────  ────────────────────────  ──────  ───────────  ──────────────
        1     Maths                          5            2
        2     History of the Modern...     2.5            2  2025-03-10 x3
        ");
    }

    #[test]
    fn remove_missing_module_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(remove(&mut Vec::new(), &db, 1).is_err());
    }
}
