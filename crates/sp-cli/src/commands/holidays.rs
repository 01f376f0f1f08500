//! `sp holidays` commands.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use sp_core::{BankHoliday, ValidationError};
use sp_db::Database;

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let holidays = db.list_holidays()?;

    if holidays.is_empty() {
        writeln!(writer, "No bank holidays.")?;
        return Ok(());
    }

    writeln!(writer, "{:<10}  {:<8}  {:>5}  Name", "Date", "Selected", "Hours")?;
    writeln!(
        writer,
        "──────────  ────────  ─────  ──────────────────────"
    )?;
    for holiday in &holidays {
        writeln!(
            writer,
            "{:<10}  {:<8}  {:>5}  {}",
            holiday.date.to_string(),
            if holiday.selected { "yes" } else { "no" },
            holiday.hours,
            holiday.name,
        )?;
    }
    Ok(())
}

/// Updates one holiday. Flags left out keep their stored value.
pub fn set<W: Write>(
    writer: &mut W,
    db: &Database,
    date: NaiveDate,
    selected: Option<bool>,
    hours: Option<u32>,
) -> Result<()> {
    let Some(holiday) = db.list_holidays()?.into_iter().find(|h| h.date == date) else {
        bail!("no bank holiday on {date}, add it with `sp holidays add`");
    };

    let selected = selected.unwrap_or(holiday.selected);
    let hours = hours.unwrap_or(holiday.hours);
    db.set_holiday(date, selected, hours)?;
    tracing::debug!(%date, selected, hours, "bank holiday updated");

    let state = if selected { "selected" } else { "not selected" };
    writeln!(writer, "{} ({date}): {state}, {hours} h", holiday.name)?;
    Ok(())
}

/// Adds a holiday, or replaces the one already on `date`.
pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    date: NaiveDate,
    name: &str,
    selected: bool,
    hours: u32,
) -> Result<BankHoliday> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty {
            field: "holiday name",
        }
        .into());
    }

    let holiday = BankHoliday {
        date,
        name: name.to_string(),
        selected,
        hours,
    };
    db.save_holiday(&holiday)?;
    tracing::debug!(%date, selected, hours, "bank holiday saved");

    let state = if selected { "selected" } else { "not selected" };
    writeln!(writer, "Saved {name} ({date}): {state}, {hours} h")?;
    Ok(holiday)
}

pub fn remove<W: Write>(writer: &mut W, db: &Database, date: NaiveDate) -> Result<()> {
    if !db.delete_holiday(date)? {
        bail!("no bank holiday on {date}");
    }
    writeln!(writer, "Removed bank holiday on {date}")?;
    Ok(())
}
