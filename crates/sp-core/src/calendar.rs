//! Planning window and per-day hour budgets.
//!
//! A run plans over `[today, latest deadline + 30 days]`. Every date in that
//! window is classified as a bank holiday, a leave day, or a regular day, and
//! given an hour budget. Days with no budget stay in the calendar (forced
//! overflow may still land on them) but are excluded from the available set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{BankHoliday, StudySettings};

/// Study hours granted to every leave day.
pub const LEAVE_DAY_HOURS: u32 = 6;

/// Days added after the latest deadline.
pub const DEADLINE_BUFFER_DAYS: i64 = 30;

/// Window length when there are no deadlines at all.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Hour quantities smaller than this are treated as zero.
pub const HOURS_EPSILON: f64 = 1e-9;

/// How a calendar day got its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Regular,
    Holiday,
    Leave,
}

impl DayKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Holiday => "holiday",
            Self::Leave => "leave",
        }
    }
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified date with its capacity accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub kind: DayKind,
    pub hours_available: f64,
    /// Hours already allocated. Only forced overflow may push this past
    /// `hours_available`.
    pub hours_used: f64,
}

impl CalendarDay {
    /// Capacity still free on this day, never negative.
    ///
    /// Float residue below [`HOURS_EPSILON`] counts as a full day.
    pub fn remaining(&self) -> f64 {
        let free = self.hours_available - self.hours_used;
        if free < HOURS_EPSILON { 0.0 } else { free }
    }

    /// Whether the day belongs to the available working set.
    pub fn is_available(&self) -> bool {
        self.hours_available > 0.0
    }
}

/// Inclusive date range a run plans over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanningWindow {
    /// Builds the window from today and the deadlines being planned for.
    ///
    /// The window always contains at least `today`, even when every deadline
    /// is long past.
    pub fn from_deadlines<I>(today: NaiveDate, deadlines: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let (anchor, pad) = match deadlines.into_iter().max() {
            Some(latest) => (latest, DEADLINE_BUFFER_DAYS),
            None => (today, DEFAULT_WINDOW_DAYS),
        };
        let end = anchor
            .checked_add_signed(Duration::days(pad))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: today,
            end: end.max(today),
        }
    }

    /// Every date in the window, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Selected bank holidays keyed by date.
#[derive(Debug, Clone, Default)]
pub struct HolidayLookup {
    by_date: BTreeMap<NaiveDate, u32>,
}

impl HolidayLookup {
    /// Indexes the selected holidays. Later duplicates of a date win.
    pub fn new(holidays: &[BankHoliday]) -> Self {
        let by_date = holidays
            .iter()
            .filter(|h| h.selected)
            .map(|h| (h.date, h.hours))
            .collect();
        Self { by_date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    /// Hours granted on a selected holiday.
    pub fn hours(&self, date: NaiveDate) -> Option<u32> {
        self.by_date.get(&date).copied()
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Picks up to `count` leave dates from `dates`.
///
/// Skips selected holidays and any date whose weekday already has study hours
/// configured, keeps Monday to Friday only, and takes the earliest `count`.
/// Returns fewer dates when not enough qualify.
pub fn select_leave_days<I>(
    dates: I,
    count: u32,
    holidays: &HolidayLookup,
    settings: &StudySettings,
) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    if count == 0 {
        return Vec::new();
    }
    dates
        .into_iter()
        .filter(|date| !holidays.contains(*date))
        .filter(|date| settings.hours_for(date.weekday()) == 0)
        .filter(|date| is_weekday(*date))
        .take(count as usize)
        .collect()
}

/// Classified days of one planning run.
///
/// Owned by a single run and discarded afterwards.
#[derive(Debug, Clone)]
pub struct Calendar {
    window: PlanningWindow,
    days: BTreeMap<NaiveDate, CalendarDay>,
    leave_days: BTreeSet<NaiveDate>,
}

impl Calendar {
    /// Classifies every date in the window.
    ///
    /// Holidays take precedence over leave days, which take precedence over
    /// the weekly study-day hours.
    pub fn build(window: PlanningWindow, settings: &StudySettings, holidays: &[BankHoliday]) -> Self {
        let lookup = HolidayLookup::new(holidays);
        let leave_days: BTreeSet<NaiveDate> =
            select_leave_days(window.dates(), settings.leave_days, &lookup, settings)
                .into_iter()
                .collect();

        let days = window
            .dates()
            .map(|date| {
                let (kind, hours) = if let Some(hours) = lookup.hours(date) {
                    (DayKind::Holiday, hours)
                } else if leave_days.contains(&date) {
                    (DayKind::Leave, LEAVE_DAY_HOURS)
                } else {
                    (DayKind::Regular, settings.hours_for(date.weekday()))
                };
                let day = CalendarDay {
                    date,
                    kind,
                    hours_available: f64::from(hours),
                    hours_used: 0.0,
                };
                (date, day)
            })
            .collect();

        tracing::debug!(
            start = %window.start,
            end = %window.end,
            leave_days = leave_days.len(),
            "built planning calendar"
        );

        Self {
            window,
            days,
            leave_days,
        }
    }

    pub const fn window(&self) -> PlanningWindow {
        self.window
    }

    /// Dates chosen as leave days, in order.
    pub fn leave_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.leave_days.iter().copied()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.get(&date)
    }

    pub(crate) fn day_mut(&mut self, date: NaiveDate) -> Option<&mut CalendarDay> {
        self.days.get_mut(&date)
    }

    /// Days with a non-zero budget, in chronological order.
    pub fn available(&self) -> impl Iterator<Item = &CalendarDay> + '_ {
        self.days.values().filter(|day| day.is_available())
    }

    /// Available days in `[from, to]` that still have free capacity.
    pub(crate) fn open_dates(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from {
            return Vec::new();
        }
        self.days
            .range(from..=to)
            .filter(|(_, day)| day.is_available() && day.remaining() > 0.0)
            .map(|(date, _)| *date)
            .collect()
    }

    /// Latest available day on or before `date`, regardless of free capacity.
    pub(crate) fn last_available_on_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        if date < self.window.start {
            return None;
        }
        self.days
            .range(..=date)
            .rev()
            .find(|(_, day)| day.is_available())
            .map(|(date, _)| *date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn mwf(hours: u32) -> StudySettings {
        StudySettings::default()
            .with_study_day(Weekday::Mon, hours)
            .with_study_day(Weekday::Wed, hours)
            .with_study_day(Weekday::Fri, hours)
    }

    #[test]
    fn window_extends_latest_deadline_by_thirty_days() {
        let window = PlanningWindow::from_deadlines(
            date(2025, 2, 24),
            [date(2025, 3, 10), date(2025, 4, 1), date(2025, 3, 1)],
        );
        assert_eq!(window.start, date(2025, 2, 24));
        assert_eq!(window.end, date(2025, 5, 1));
    }

    #[test]
    fn window_defaults_to_ninety_days() {
        let window = PlanningWindow::from_deadlines(date(2025, 1, 1), []);
        assert_eq!(window.end, date(2025, 4, 1));
        assert_eq!(window.dates().count(), 91);
    }

    #[test]
    fn window_dates_are_restartable_and_inclusive() {
        let window = PlanningWindow {
            start: date(2025, 2, 27),
            end: date(2025, 3, 2),
        };
        let first: Vec<_> = window.dates().collect();
        let second: Vec<_> = window.dates().collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                date(2025, 2, 27),
                date(2025, 2, 28),
                date(2025, 3, 1),
                date(2025, 3, 2)
            ]
        );
    }

    #[test]
    fn window_saturates_at_the_last_representable_date() {
        let window = PlanningWindow::from_deadlines(date(2025, 6, 1), [NaiveDate::MAX]);
        assert_eq!(window.end, NaiveDate::MAX);

        let window = PlanningWindow::from_deadlines(NaiveDate::MAX, []);
        assert_eq!((window.start, window.end), (NaiveDate::MAX, NaiveDate::MAX));
    }

    #[test]
    fn float_residue_leaves_no_capacity() {
        let day = CalendarDay {
            date: date(2025, 2, 24),
            hours_available: 4.0,
            kind: DayKind::Regular,
            hours_used: 3.7 + 0.299_999_999_999_999_8,
        };
        assert_eq!(day.remaining(), 0.0);
    }

    #[test]
    fn window_with_past_deadline_keeps_today() {
        let window = PlanningWindow::from_deadlines(date(2025, 6, 1), [date(2025, 1, 1)]);
        assert_eq!(window.dates().collect::<Vec<_>>(), vec![date(2025, 6, 1)]);
    }

    #[test]
    fn leave_days_skip_holidays_study_weekdays_and_weekends() {
        // Monday 2025-02-24 through Sunday 2025-03-09.
        let window = PlanningWindow {
            start: date(2025, 2, 24),
            end: date(2025, 3, 9),
        };
        let holidays = vec![
            BankHoliday::new(date(2025, 2, 25), "Selected").selected_with_hours(0),
            BankHoliday::new(date(2025, 2, 27), "Ignored"),
        ];
        let lookup = HolidayLookup::new(&holidays);

        let leave = select_leave_days(window.dates(), 3, &lookup, &mwf(4));
        assert_eq!(
            leave,
            vec![date(2025, 2, 27), date(2025, 3, 4), date(2025, 3, 6)]
        );
    }

    #[test]
    fn leave_days_return_fewer_when_not_enough_qualify() {
        let window = PlanningWindow {
            start: date(2025, 2, 24),
            end: date(2025, 3, 2),
        };
        let settings = mwf(2)
            .with_study_day(Weekday::Tue, 1)
            .with_study_day(Weekday::Thu, 1);
        let leave = select_leave_days(window.dates(), 5, &HolidayLookup::default(), &settings);
        assert!(leave.is_empty());

        let leave = select_leave_days(window.dates(), 10, &HolidayLookup::default(), &mwf(2));
        assert_eq!(leave, vec![date(2025, 2, 25), date(2025, 2, 27)]);
    }

    #[test]
    fn classification_prefers_holiday_then_leave_then_weekday() {
        let window = PlanningWindow {
            start: date(2025, 2, 24),
            end: date(2025, 3, 2),
        };
        let mut settings = mwf(4);
        settings.leave_days = 1;
        let holidays = vec![BankHoliday::new(date(2025, 2, 26), "Midweek").selected_with_hours(2)];

        let calendar = Calendar::build(window, &settings, &holidays);

        let monday = calendar.day(date(2025, 2, 24)).unwrap();
        assert_eq!(monday.kind, DayKind::Regular);
        assert!((monday.hours_available - 4.0).abs() < f64::EPSILON);

        let tuesday = calendar.day(date(2025, 2, 25)).unwrap();
        assert_eq!(tuesday.kind, DayKind::Leave);
        assert!((tuesday.hours_available - f64::from(LEAVE_DAY_HOURS)).abs() < f64::EPSILON);

        let wednesday = calendar.day(date(2025, 2, 26)).unwrap();
        assert_eq!(wednesday.kind, DayKind::Holiday);
        assert!((wednesday.hours_available - 2.0).abs() < f64::EPSILON);

        assert_eq!(
            calendar.leave_days().collect::<Vec<_>>(),
            vec![date(2025, 2, 25)]
        );
    }

    #[test]
    fn zero_hour_days_are_not_available() {
        let window = PlanningWindow {
            start: date(2025, 2, 24),
            end: date(2025, 3, 2),
        };
        let holidays = vec![BankHoliday::new(date(2025, 2, 24), "Closed").selected_with_hours(0)];
        let calendar = Calendar::build(window, &mwf(4), &holidays);

        let available: Vec<_> = calendar.available().map(|d| d.date).collect();
        assert_eq!(available, vec![date(2025, 2, 26), date(2025, 2, 28)]);
        assert_eq!(
            calendar.day(date(2025, 2, 24)).unwrap().kind,
            DayKind::Holiday
        );
    }

    #[test]
    fn last_available_day_ignores_capacity_but_not_budget() {
        let window = PlanningWindow {
            start: date(2025, 2, 24),
            end: date(2025, 3, 9),
        };
        let mut calendar = Calendar::build(window, &mwf(4), &[]);
        calendar.day_mut(date(2025, 2, 28)).unwrap().hours_used = 4.0;

        assert_eq!(
            calendar.last_available_on_or_before(date(2025, 3, 2)),
            Some(date(2025, 2, 28))
        );
        assert_eq!(calendar.last_available_on_or_before(date(2025, 2, 23)), None);
        assert_eq!(
            calendar.open_dates(date(2025, 2, 24), date(2025, 3, 2)),
            vec![date(2025, 2, 24), date(2025, 2, 26)]
        );
    }
}
