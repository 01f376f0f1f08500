//! Study-hour allocation.
//!
//! Distributes each assignment's study and submission quotas over the
//! planning calendar.
//!
//! # Algorithm Summary
//!
//! 1. Sort assignments by due date (stable, so ties keep input order)
//! 2. For each assignment, derive the submission cutoff (`due - days_before`)
//! 3. Study phase: fill free capacity from today up to the cutoff, earliest first
//! 4. Submission phase: fill free capacity strictly after the last study day,
//!    falling back to any free day before the cutoff
//! 5. Whatever still does not fit is forced onto a single day, ignoring its
//!    capacity (see [`ForcedOverflowReason`])
//!
//! Day capacity is shared: hours taken by an earlier deadline are gone for
//! later ones. The distributor never fails and never drops hours.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, DayKind, HOURS_EPSILON};
use crate::types::{Assignment, Module};

/// Which quota an entry draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Study,
    Submission,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Submission => "Submission",
        }
    }

    /// Verb used in "hours left to ..." annotations.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Submission => "submit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slice of work placed on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub assignment_id: i64,
    /// Display label, e.g. `"Maths - Essay (Study)"`.
    pub module: String,
    pub hours: f64,
    /// Due date minus this day. Negative when placed past the deadline.
    pub days_to_deadline: i64,
    pub day_type: DayKind,
    /// Quota left in this phase after this entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_type: Option<Phase>,
    pub original_study_hours: f64,
    pub original_submission_hours: f64,
}

/// Why an allocation ignored day capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedOverflowReason {
    /// No free capacity before the cutoff. Placed on the latest available day
    /// on or before the cutoff, after resetting that day's used hours.
    CapacityExhausted,
    /// Remaining hours pushed onto the assignment's own last study day.
    LastStudyDay,
    /// No available day exists on or before the cutoff (it is already past).
    /// Placed on the first day of the window.
    NoEligibleDay,
}

/// A placement that bypassed day capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcedOverflow {
    pub assignment_id: i64,
    pub phase: Phase,
    pub date: NaiveDate,
    pub hours: f64,
    pub reason: ForcedOverflowReason,
}

/// Why an assignment produced no entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    UnknownModule { module_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAssignment {
    pub assignment_id: i64,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Output of one planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    /// Entries per date, in insertion order within a date.
    pub days: BTreeMap<NaiveDate, Vec<AllocationEntry>>,
    #[serde(default)]
    pub forced: Vec<ForcedOverflow>,
    #[serde(default)]
    pub skipped: Vec<SkippedAssignment>,
}

impl StudyPlan {
    /// All entries in date order.
    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, &AllocationEntry)> + '_ {
        self.days
            .iter()
            .flat_map(|(date, entries)| entries.iter().map(move |entry| (*date, entry)))
    }

    /// Entries for one assignment and phase, in date order.
    pub fn entries_for(
        &self,
        assignment_id: i64,
        phase: Phase,
    ) -> impl Iterator<Item = (NaiveDate, &AllocationEntry)> + '_ {
        self.entries().filter(move |(_, entry)| {
            entry.assignment_id == assignment_id && entry.hours_type == Some(phase)
        })
    }

    /// Total hours placed for one assignment and phase.
    pub fn total_hours(&self, assignment_id: i64, phase: Phase) -> f64 {
        self.entries_for(assignment_id, phase)
            .map(|(_, entry)| entry.hours)
            .sum()
    }

    /// Whether any entry was placed at all.
    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    fn push(&mut self, date: NaiveDate, entry: AllocationEntry) {
        self.days.entry(date).or_default().push(entry);
    }
}

/// Per-assignment facts needed while allocating.
struct Task<'a> {
    assignment: &'a Assignment,
    module_name: &'a str,
    submission_date: NaiveDate,
}

impl Task<'_> {
    fn label(&self, phase: Phase) -> String {
        format!(
            "{} - {} ({})",
            self.module_name, self.assignment.name, phase
        )
    }

    fn quota(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Study => self.assignment.study_hours,
            Phase::Submission => self.assignment.submission_hours,
        }
    }
}

/// Last date submission work may land on: `due - days_before`.
///
/// Saturates to [`NaiveDate::MIN`] when the lead time is out of range,
/// which sends the submission to the no-eligible-day fallback.
fn submission_cutoff(due: NaiveDate, days_before: i64) -> NaiveDate {
    Duration::try_days(days_before)
        .and_then(|lead| due.checked_sub_signed(lead))
        .unwrap_or(NaiveDate::MIN)
}

/// Greedy allocator over one run's calendar.
pub struct HourDistributor<'c> {
    calendar: &'c mut Calendar,
    plan: StudyPlan,
}

impl<'c> HourDistributor<'c> {
    /// Starts a plan with an empty entry list for every available day.
    pub fn new(calendar: &'c mut Calendar) -> Self {
        let days = calendar
            .available()
            .map(|day| (day.date, Vec::new()))
            .collect();
        Self {
            calendar,
            plan: StudyPlan {
                days,
                ..StudyPlan::default()
            },
        }
    }

    /// Allocates every assignment, earliest due date first.
    ///
    /// Assignments whose module is missing are skipped and recorded.
    pub fn distribute(mut self, modules: &[Module], assignments: &[Assignment]) -> StudyPlan {
        let mut modules_by_id: HashMap<i64, &Module> = HashMap::new();
        for module in modules {
            modules_by_id.entry(module.id).or_insert(module);
        }

        let mut ordered: Vec<&Assignment> = assignments.iter().collect();
        ordered.sort_by_key(|assignment| assignment.due_date);

        for assignment in ordered {
            let Some(module) = modules_by_id.get(&assignment.module_id) else {
                tracing::warn!(
                    assignment_id = assignment.id,
                    module_id = assignment.module_id,
                    "skipping assignment with unknown module"
                );
                self.plan.skipped.push(SkippedAssignment {
                    assignment_id: assignment.id,
                    reason: SkipReason::UnknownModule {
                        module_id: assignment.module_id,
                    },
                });
                continue;
            };

            let task = Task {
                assignment,
                module_name: &module.name,
                submission_date: submission_cutoff(assignment.due_date, module.days_before),
            };
            let last_study_day = self.allocate_study(&task);
            self.allocate_submission(&task, last_study_day);
        }

        self.plan
    }

    /// Places the study quota. Returns the last day that received study hours.
    fn allocate_study(&mut self, task: &Task<'_>) -> Option<NaiveDate> {
        let quota = task.quota(Phase::Study);
        if quota < HOURS_EPSILON {
            return None;
        }

        let start = self.calendar.window().start;
        let candidates = self.calendar.open_dates(start, task.submission_date);
        let (remaining, mut last_day) = self.fill(task, Phase::Study, &candidates, quota);

        if remaining > 0.0 {
            let (date, reason) = match last_day {
                Some(date) => (date, ForcedOverflowReason::LastStudyDay),
                None => self.overflow_anchor(task.submission_date),
            };
            self.force(task, Phase::Study, date, remaining, reason);
            last_day = Some(date);
        }

        last_day
    }

    /// Places the submission quota once study is fully placed.
    fn allocate_submission(&mut self, task: &Task<'_>, last_study_day: Option<NaiveDate>) {
        let quota = task.quota(Phase::Submission);
        if quota < HOURS_EPSILON {
            return;
        }

        let start = self.calendar.window().start;
        let after_study = last_study_day.and_then(|d| d.succ_opt()).unwrap_or(start);
        let mut candidates = self.calendar.open_dates(after_study, task.submission_date);
        if candidates.is_empty() {
            tracing::debug!(
                assignment_id = task.assignment.id,
                "no free day after study phase, using any free day before cutoff"
            );
            candidates = self.calendar.open_dates(start, task.submission_date);
        }

        if candidates.is_empty() {
            let (date, reason) = self.overflow_anchor(task.submission_date);
            self.force(task, Phase::Submission, date, quota, reason);
            return;
        }

        let (remaining, _) = self.fill(task, Phase::Submission, &candidates, quota);
        if remaining > 0.0 {
            let (date, reason) = match last_study_day {
                Some(date) => (date, ForcedOverflowReason::LastStudyDay),
                None => self.overflow_anchor(task.submission_date),
            };
            self.force(task, Phase::Submission, date, remaining, reason);
        }
    }

    /// Walks `dates` placing `min(free capacity, remaining)` on each.
    ///
    /// Returns the unplaced remainder and the last date used.
    fn fill(
        &mut self,
        task: &Task<'_>,
        phase: Phase,
        dates: &[NaiveDate],
        quota: f64,
    ) -> (f64, Option<NaiveDate>) {
        let mut remaining = quota;
        let mut last_day = None;

        for &date in dates {
            if remaining <= 0.0 {
                break;
            }
            let Some(day) = self.calendar.day_mut(date) else {
                continue;
            };
            let free = day.remaining();
            if free <= 0.0 {
                continue;
            }

            let hours = free.min(remaining);
            remaining -= hours;
            if remaining < HOURS_EPSILON {
                remaining = 0.0;
            }
            day.hours_used += hours;
            let kind = day.kind;

            tracing::debug!(
                assignment_id = task.assignment.id,
                %date,
                hours,
                remaining,
                phase = phase.as_str(),
                "allocated hours"
            );
            self.record(task, phase, date, kind, hours, remaining);
            last_day = Some(date);
        }

        (remaining, last_day)
    }

    /// Day that absorbs hours when nothing else fits.
    fn overflow_anchor(&self, submission_date: NaiveDate) -> (NaiveDate, ForcedOverflowReason) {
        self.calendar
            .last_available_on_or_before(submission_date)
            .map_or(
                (
                    self.calendar.window().start,
                    ForcedOverflowReason::NoEligibleDay,
                ),
                |date| (date, ForcedOverflowReason::CapacityExhausted),
            )
    }

    /// Places `hours` on `date` regardless of capacity.
    ///
    /// `CapacityExhausted` and `NoEligibleDay` reset the day's used hours
    /// first, so the day ends up oversubscribed only by this placement.
    fn force(
        &mut self,
        task: &Task<'_>,
        phase: Phase,
        date: NaiveDate,
        hours: f64,
        reason: ForcedOverflowReason,
    ) {
        let kind = match self.calendar.day_mut(date) {
            Some(day) => {
                if reason != ForcedOverflowReason::LastStudyDay {
                    day.hours_used = 0.0;
                }
                day.hours_used += hours;
                day.kind
            }
            None => DayKind::Regular,
        };

        tracing::warn!(
            assignment_id = task.assignment.id,
            %date,
            hours,
            phase = phase.as_str(),
            ?reason,
            "forced allocation past day capacity"
        );
        self.record(task, phase, date, kind, hours, 0.0);
        self.plan.forced.push(ForcedOverflow {
            assignment_id: task.assignment.id,
            phase,
            date,
            hours,
            reason,
        });
    }

    fn record(
        &mut self,
        task: &Task<'_>,
        phase: Phase,
        date: NaiveDate,
        kind: DayKind,
        hours: f64,
        hours_left: f64,
    ) {
        let entry = AllocationEntry {
            assignment_id: task.assignment.id,
            module: task.label(phase),
            hours,
            days_to_deadline: (task.assignment.due_date - date).num_days(),
            day_type: kind,
            hours_left: Some(hours_left),
            hours_type: Some(phase),
            original_study_hours: task.assignment.study_hours,
            original_submission_hours: task.assignment.submission_hours,
        };
        self.plan.push(date, entry);
    }
}
