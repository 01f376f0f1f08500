//! `sp assignment` commands.

use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result, bail};
use sp_core::Assignment;
use sp_db::Database;

use super::truncate;
use crate::AssignmentArgs;
use crate::render::format_hours;

/// Adds an assignment, or replaces the one named by `--id`.
pub fn add<W: Write>(writer: &mut W, db: &Database, args: &AssignmentArgs) -> Result<Assignment> {
    let id = match args.id {
        Some(id) => {
            if db.get_assignment(id)?.is_none() {
                bail!("assignment {id} does not exist");
            }
            id
        }
        None => db.next_assignment_id()?,
    };

    let assignment = Assignment::new(
        id,
        args.module,
        args.name.trim(),
        args.due,
        args.study,
        args.submission,
    )?;
    db.save_assignment(&assignment)
        .context("failed to save assignment")?;
    tracing::debug!(id, module_id = args.module, "assignment saved");

    writeln!(
        writer,
        "Saved assignment {id}: {} (due {})",
        assignment.name, assignment.due_date
    )?;
    Ok(assignment)
}

pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    module: Option<i64>,
    json: bool,
) -> Result<()> {
    let assignments = match module {
        Some(module_id) => db.list_assignments_for_module(module_id)?,
        None => db.list_assignments()?,
    };

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&assignments)?)?;
        return Ok(());
    }

    if assignments.is_empty() {
        writeln!(writer, "No assignments.")?;
        return Ok(());
    }

    let module_names: HashMap<i64, String> = db
        .list_modules()?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();

    writeln!(
        writer,
        "{:<4}  {:<16}  {:<24}  {:<10}  {:>6}  {:>6}",
        "ID", "Module", "Name", "Due", "Study", "Submit"
    )?;
    writeln!(
        writer,
        "────  ────────────────  ────────────────────────  ──────────  ──────  ──────"
    )?;
    for assignment in &assignments {
        let module_name = module_names
            .get(&assignment.module_id)
            .map_or("?", String::as_str);
        writeln!(
            writer,
            "{:<4}  {:<16}  {:<24}  {:<10}  {:>6}  {:>6}",
            assignment.id,
            truncate(module_name, 16),
            truncate(&assignment.name, 24),
            assignment.due_date.to_string(),
            format_hours(assignment.study_hours),
            format_hours(assignment.submission_hours),
        )?;
    }
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &Database, id: i64) -> Result<()> {
    if !db.delete_assignment(id)? {
        bail!("assignment {id} does not exist");
    }
    writeln!(writer, "Removed assignment {id}")?;
    Ok(())
}
