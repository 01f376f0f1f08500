//! `sp export`: write the study plan as a spreadsheet or calendar page.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sp_core::StudyPlan;
use sp_db::Database;

use super::plan;
use crate::ExportFormat;
use crate::render::{CalendarStyle, calendar, spreadsheet};

/// Renders `plan` into file contents for `format`.
pub fn render(plan: &StudyPlan, format: ExportFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Xlsx => spreadsheet::render(plan).context("failed to build spreadsheet")?,
        ExportFormat::Html | ExportFormat::Print => {
            let style = if format == ExportFormat::Print {
                CalendarStyle::Print
            } else {
                CalendarStyle::Screen
            };
            let mut html = String::new();
            calendar::render(&mut html, plan, style)?;
            html.into_bytes()
        }
    };
    Ok(bytes)
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    format: ExportFormat,
    output: &Path,
    today: NaiveDate,
) -> Result<()> {
    let plan = plan::build(db, today)?;
    let bytes = render(&plan, format)?;

    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), ?format, "exported study plan");

    writeln!(writer, "Wrote {}", output.display())?;
    Ok(())
}
