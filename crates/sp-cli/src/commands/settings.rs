//! `sp settings` commands.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Weekday;
use sp_core::{parse_weekday, weekday_name};
use sp_db::Database;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn show<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let settings = db.load_settings()?;

    if settings.study_days.is_empty() {
        writeln!(writer, "Study days: none")?;
    } else {
        writeln!(writer, "Study days:")?;
        for weekday in WEEK {
            let hours = settings.hours_for(weekday);
            if hours > 0 {
                writeln!(writer, "  {:<10} {hours} h", weekday_name(weekday))?;
            }
        }
    }
    writeln!(writer, "Leave days: {}", settings.leave_days)?;
    Ok(())
}

/// Sets the hours for one weekday. Zero hours clears it.
pub fn study_day<W: Write>(
    writer: &mut W,
    db: &mut Database,
    weekday: &str,
    hours: u32,
) -> Result<()> {
    let weekday = parse_weekday(weekday)?;
    let mut settings = db.load_settings()?;
    settings.set_study_day(weekday, hours);
    db.save_settings(&settings)
        .context("failed to save settings")?;

    let name = weekday_name(weekday);
    if hours == 0 {
        writeln!(writer, "{name}: cleared")?;
    } else {
        writeln!(writer, "{name}: {hours} h")?;
    }
    Ok(())
}

pub fn leave_days<W: Write>(writer: &mut W, db: &mut Database, count: u32) -> Result<()> {
    let mut settings = db.load_settings()?;
    settings.leave_days = count;
    db.save_settings(&settings)
        .context("failed to save settings")?;
    writeln!(writer, "Leave days: {count}")?;
    Ok(())
}
