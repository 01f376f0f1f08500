//! Core domain logic for the study planner.
//!
//! This crate contains the fundamental types and logic for:
//! - Calendar: the planning window and per-day hour budgets
//! - Leave days: picking extra weekdays off
//! - Allocation: spreading study and submission hours before each deadline

mod allocation;
pub mod calendar;
pub mod legacy;
mod planner;
pub mod types;

pub use allocation::{
    AllocationEntry, ForcedOverflow, ForcedOverflowReason, HourDistributor, Phase, SkipReason,
    SkippedAssignment, StudyPlan,
};
pub use calendar::{Calendar, CalendarDay, DayKind, PlanningWindow, select_leave_days};
pub use planner::{PlanInput, build_study_plan};
pub use types::{
    Assignment, BankHoliday, DATE_FORMAT, MAX_DAYS_BEFORE, MAX_DUE_YEAR, MIN_DUE_YEAR, Module,
    StudySettings, ValidationError, default_bank_holidays, parse_date, parse_weekday,
    weekday_name,
};
