//! HTML month calendars.
//!
//! Each month that has entries becomes a Sunday-first grid. Entries are
//! colour-coded by the kind of day they fall on. The print style puts every
//! month on its own page.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use chrono::{Datelike, NaiveDate};
use sp_core::{AllocationEntry, DayKind, StudyPlan};

use super::{format_hours, hours_left_text};

const WEEKDAY_HEADERS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const BASE_CSS: &str = "
body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
h1 { color: #2c3e50; text-align: center; margin-bottom: 30px; }
h2 { color: #3498db; margin-top: 40px; border-bottom: 2px solid #3498db; padding-bottom: 5px; }
.calendar { width: 100%; border-collapse: collapse; margin-bottom: 30px; table-layout: fixed; }
.calendar th { background-color: #3498db; color: white; padding: 10px; }
.calendar td { border: 1px solid #ddd; padding: 8px; height: 100px; vertical-align: top; }
.calendar .empty { background-color: #f9f9f9; }
.day-number { font-weight: bold; text-align: right; margin-bottom: 5px; }
.task { margin-bottom: 5px; padding: 5px; border-radius: 3px; font-size: 0.9em; }
.task.regular, .legend-regular { background-color: #cce5ff; }
.task.holiday, .legend-holiday { background-color: #ffcccc; }
.task.leave, .legend-leave { background-color: #ccffcc; }
.hours { font-weight: bold; }
.days-to-deadline, .hours-left { font-style: italic; font-size: 0.8em; }
.legend { text-align: center; margin: 20px 0 40px; }
.legend-item { display: inline-block; margin: 0 15px; }
.legend-color { display: inline-block; width: 20px; height: 20px; margin-right: 5px; vertical-align: middle; border-radius: 3px; }
";

const SCREEN_CSS: &str = "
@media print {
  .calendar { page-break-inside: avoid; }
}
";

const PRINT_CSS: &str = "
@page { size: A4 landscape; margin: 12mm; }
body { margin: 0; }
.month { page-break-after: always; }
.month:last-of-type { page-break-after: auto; }
.calendar { page-break-inside: avoid; }
.calendar td { height: 80px; }
";

/// Page layout for the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarStyle {
    /// Continuous page for a browser.
    Screen,
    /// One month per printed page.
    Print,
}

/// Writes the full HTML document for `plan`.
pub fn render<W: Write>(out: &mut W, plan: &StudyPlan, style: CalendarStyle) -> fmt::Result {
    let extra_css = match style {
        CalendarStyle::Screen => SCREEN_CSS,
        CalendarStyle::Print => PRINT_CSS,
    };

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Study Plan Calendar</title>")?;
    writeln!(out, "<style>{BASE_CSS}{extra_css}</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>Study Plan Calendar</h1>")?;
    write_legend(out)?;

    let months = group_by_month(plan);
    if months.is_empty() {
        writeln!(out, "<p>Nothing scheduled.</p>")?;
    }
    for (first, days) in &months {
        write_month(out, *first, days)?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

type MonthDays<'p> = BTreeMap<u32, &'p [AllocationEntry]>;

/// Non-empty days keyed by the first day of their month.
fn group_by_month(plan: &StudyPlan) -> BTreeMap<NaiveDate, MonthDays<'_>> {
    let mut months: BTreeMap<NaiveDate, MonthDays<'_>> = BTreeMap::new();
    for (date, entries) in &plan.days {
        if entries.is_empty() {
            continue;
        }
        let Some(first) = date.with_day(1) else {
            continue;
        };
        months
            .entry(first)
            .or_default()
            .insert(date.day(), entries.as_slice());
    }
    months
}

fn write_legend<W: Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "<div class=\"legend\">")?;
    for (kind, label) in [
        (DayKind::Regular, "Regular Study Day"),
        (DayKind::Holiday, "Holiday"),
        (DayKind::Leave, "Leave Day"),
    ] {
        writeln!(
            out,
            "<div class=\"legend-item\"><span class=\"legend-color legend-{kind}\"></span> {label}</div>"
        )?;
    }
    writeln!(out, "</div>")
}

fn write_month<W: Write>(out: &mut W, first: NaiveDate, days: &MonthDays<'_>) -> fmt::Result {
    writeln!(out, "<section class=\"month\">")?;
    writeln!(out, "<h2>{}</h2>", first.format("%B %Y"))?;
    writeln!(out, "<table class=\"calendar\">")?;
    write!(out, "<tr>")?;
    for header in WEEKDAY_HEADERS {
        write!(out, "<th>{header}</th>")?;
    }
    writeln!(out, "</tr>")?;

    let leading = first.weekday().num_days_from_sunday();
    write!(out, "<tr>")?;
    for _ in 0..leading {
        write!(out, "<td class=\"empty\"></td>")?;
    }

    let mut column = leading;
    for date in first.iter_days().take_while(|d| d.month() == first.month()) {
        if column == 7 {
            writeln!(out, "</tr>")?;
            write!(out, "<tr>")?;
            column = 0;
        }
        write!(out, "<td><div class=\"day-number\">{}</div>", date.day())?;
        for entry in days.get(&date.day()).copied().unwrap_or_default() {
            write_task(out, entry)?;
        }
        write!(out, "</td>")?;
        column += 1;
    }

    for _ in column..7 {
        write!(out, "<td class=\"empty\"></td>")?;
    }
    writeln!(out, "</tr>")?;
    writeln!(out, "</table>")?;
    writeln!(out, "</section>")
}

fn write_task<W: Write>(out: &mut W, entry: &AllocationEntry) -> fmt::Result {
    write!(
        out,
        "<div class=\"task {}\">{}<br><span class=\"hours\">{} hrs</span> \
         <span class=\"days-to-deadline\">({} days to deadline)</span>",
        entry.day_type,
        escape(&entry.module),
        format_hours(entry.hours),
        entry.days_to_deadline,
    )?;
    if let Some(left) = hours_left_text(entry, "hrs") {
        write!(out, " <span class=\"hours-left\">({left})</span>")?;
    }
    write!(out, "</div>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
