//! Planner input records with validation.
//!
//! These are the snapshots the engine reads. They are validated once at the
//! boundary (CLI, storage) so the engine can assume well-formed input.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used for every stored and rendered calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Smallest per-assignment hour requirement a module may declare.
pub const MIN_HOURS_REQUIRED: f64 = 0.5;

/// Longest submission lead time a module may declare, in days.
pub const MAX_DAYS_BEFORE: i64 = 365;

/// Due dates must fall within these calendar years.
pub const MIN_DUE_YEAR: i32 = 1900;
pub const MAX_DUE_YEAR: i32 = 2999;

/// Validation errors for planner inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A date string was not in `YYYY-MM-DD` form.
    #[error("invalid {field}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    /// A weekday name was not recognised.
    #[error("unknown weekday: {value}")]
    UnknownWeekday { value: String },

    /// An hour quantity was negative, NaN, or below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    HoursOutOfRange {
        field: &'static str,
        min: f64,
        value: f64,
    },

    /// A day count was negative.
    #[error("{field} cannot be negative, got {value}")]
    NegativeDays { field: &'static str, value: i64 },

    /// A day count exceeded its maximum.
    #[error("{field} must be at most {max}, got {value}")]
    TooManyDays {
        field: &'static str,
        max: i64,
        value: i64,
    },

    /// A due date fell outside the supported years.
    #[error("{field} must be between {min} and {max}, got {value}", min = MIN_DUE_YEAR, max = MAX_DUE_YEAR)]
    DateOutOfRange { field: &'static str, value: NaiveDate },
}

/// Parses a `YYYY-MM-DD` date, naming the offending field on failure.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

/// Lowercase English weekday name, as used in [`StudySettings::study_days`].
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parses a weekday name. Accepts full names and three-letter abbreviations, any case.
pub fn parse_weekday(value: &str) -> Result<Weekday, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err(ValidationError::UnknownWeekday {
            value: value.to_string(),
        }),
    }
}

fn check_hours(field: &'static str, min: f64, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < min {
        return Err(ValidationError::HoursOutOfRange { field, min, value });
    }
    Ok(())
}

fn check_due_date(field: &'static str, value: NaiveDate) -> Result<(), ValidationError> {
    if !(MIN_DUE_YEAR..=MAX_DUE_YEAR).contains(&value.year()) {
        return Err(ValidationError::DateOutOfRange { field, value });
    }
    Ok(())
}

fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// A course unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
    /// Hours needed per assignment.
    pub hours_required: f64,
    /// Submission prep must be finished this many days before a due date.
    pub days_before: i64,

    /// Legacy module-level due date, used only when no assignments exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Legacy assignment count, used only when no assignments exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<u32>,
}

impl Module {
    /// Creates a module after validation.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        hours_required: f64,
        days_before: i64,
    ) -> Result<Self, ValidationError> {
        let module = Self {
            id,
            name: name.into(),
            hours_required,
            days_before,
            due_date: None,
            assignments: None,
        };
        module.validate()?;
        Ok(module)
    }

    /// Attaches the legacy module-level deadline and assignment count.
    #[must_use]
    pub fn with_legacy_deadline(mut self, due_date: NaiveDate, assignments: u32) -> Self {
        self.due_date = Some(due_date);
        self.assignments = Some(assignments);
        self
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("module name", &self.name)?;
        check_hours("hours required", MIN_HOURS_REQUIRED, self.hours_required)?;
        if self.days_before < 0 {
            return Err(ValidationError::NegativeDays {
                field: "days before",
                value: self.days_before,
            });
        }
        if self.days_before > MAX_DAYS_BEFORE {
            return Err(ValidationError::TooManyDays {
                field: "days before",
                max: MAX_DAYS_BEFORE,
                value: self.days_before,
            });
        }
        if let Some(due) = self.due_date {
            check_due_date("module due date", due)?;
        }
        Ok(())
    }
}

/// A deliverable belonging to one [`Module`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub study_hours: f64,
    #[serde(default)]
    pub submission_hours: f64,
}

impl Assignment {
    /// Creates an assignment after validation.
    pub fn new(
        id: i64,
        module_id: i64,
        name: impl Into<String>,
        due_date: NaiveDate,
        study_hours: f64,
        submission_hours: f64,
    ) -> Result<Self, ValidationError> {
        let assignment = Self {
            id,
            module_id,
            name: name.into(),
            due_date,
            study_hours,
            submission_hours,
        };
        assignment.validate()?;
        Ok(assignment)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("assignment name", &self.name)?;
        check_hours("study hours", 0.0, self.study_hours)?;
        check_hours("submission hours", 0.0, self.submission_hours)?;
        check_due_date("due date", self.due_date)?;
        Ok(())
    }
}

/// Recurring weekly availability plus the leave allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySettings {
    /// Hours available per weekday, keyed by lowercase weekday name.
    #[serde(default)]
    pub study_days: BTreeMap<String, u32>,
    /// Number of leave days to place in the planning window.
    #[serde(default)]
    pub leave_days: u32,
}

impl StudySettings {
    /// Sets the hours available on a weekday. Zero removes the weekday.
    pub fn set_study_day(&mut self, weekday: Weekday, hours: u32) {
        let key = weekday_name(weekday).to_string();
        if hours == 0 {
            self.study_days.remove(&key);
        } else {
            self.study_days.insert(key, hours);
        }
    }

    /// Builder form of [`Self::set_study_day`].
    #[must_use]
    pub fn with_study_day(mut self, weekday: Weekday, hours: u32) -> Self {
        self.set_study_day(weekday, hours);
        self
    }

    /// Hours configured for a weekday, 0 when unset.
    pub fn hours_for(&self, weekday: Weekday) -> u32 {
        self.study_days
            .get(weekday_name(weekday))
            .copied()
            .unwrap_or(0)
    }

    /// Rejects keys that are not lowercase weekday names.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for key in self.study_days.keys() {
            let weekday = parse_weekday(key)?;
            if weekday_name(weekday) != key {
                return Err(ValidationError::UnknownWeekday { value: key.clone() });
            }
        }
        Ok(())
    }
}

/// A public holiday the user may opt into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankHoliday {
    pub date: NaiveDate,
    pub name: String,
    /// Only selected holidays affect the plan.
    #[serde(default)]
    pub selected: bool,
    /// Study hours available on the holiday, often 0.
    #[serde(default)]
    pub hours: u32,
}

impl BankHoliday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            selected: false,
            hours: 0,
        }
    }

    /// Marks the holiday as selected with the given study hours.
    #[must_use]
    pub fn selected_with_hours(mut self, hours: u32) -> Self {
        self.selected = true;
        self.hours = hours;
        self
    }
}

/// England and Wales bank holidays for 2025, all unselected.
pub fn default_bank_holidays() -> Vec<BankHoliday> {
    [
        ((2025, 1, 1), "New Year's Day"),
        ((2025, 4, 18), "Good Friday"),
        ((2025, 4, 21), "Easter Monday"),
        ((2025, 5, 5), "Early May Bank Holiday"),
        ((2025, 5, 26), "Spring Bank Holiday"),
        ((2025, 8, 25), "Summer Bank Holiday"),
        ((2025, 12, 25), "Christmas Day"),
        ((2025, 12, 26), "Boxing Day"),
    ]
    .into_iter()
    .filter_map(|((y, m, d), name)| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| BankHoliday::new(date, name))
    })
    .collect()
}
