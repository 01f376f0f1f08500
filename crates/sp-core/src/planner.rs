//! Planning run entry point.
//!
//! Wires the calendar window, leave-day selection and hour distribution
//! together. Each call builds its own calendar and discards it.

use chrono::NaiveDate;

use crate::allocation::{HourDistributor, StudyPlan};
use crate::calendar::{Calendar, PlanningWindow};
use crate::legacy;
use crate::types::{Assignment, BankHoliday, Module, StudySettings};

/// Read-only snapshot of everything a run needs.
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub modules: &'a [Module],
    pub assignments: &'a [Assignment],
    pub settings: &'a StudySettings,
    pub holidays: &'a [BankHoliday],
}

/// Plans study time from `today` onwards.
///
/// With no assignments, dated modules are planned through the legacy
/// compatibility path instead.
pub fn build_study_plan(input: &PlanInput<'_>, today: NaiveDate) -> StudyPlan {
    if input.assignments.is_empty() {
        let synthetic = legacy::synthetic_assignments(input.modules);
        let plan = distribute(input, &synthetic, today);
        return legacy::into_legacy_plan(plan, input.modules);
    }
    distribute(input, input.assignments, today)
}

fn distribute(input: &PlanInput<'_>, assignments: &[Assignment], today: NaiveDate) -> StudyPlan {
    let window = PlanningWindow::from_deadlines(today, assignments.iter().map(|a| a.due_date));
    let mut calendar = Calendar::build(window, input.settings, input.holidays);
    let plan = HourDistributor::new(&mut calendar).distribute(input.modules, assignments);

    tracing::info!(
        %today,
        assignments = assignments.len(),
        entries = plan.entries().count(),
        forced = plan.forced.len(),
        skipped = plan.skipped.len(),
        "study plan built"
    );
    plan
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Weekday;

    use super::*;
    use crate::allocation::{ForcedOverflowReason, Phase};
    use crate::calendar::DayKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn mwf(hours: u32) -> StudySettings {
        StudySettings::default()
            .with_study_day(Weekday::Mon, hours)
            .with_study_day(Weekday::Wed, hours)
            .with_study_day(Weekday::Fri, hours)
    }

    struct Fixture {
        modules: Vec<Module>,
        assignments: Vec<Assignment>,
        settings: StudySettings,
        holidays: Vec<BankHoliday>,
    }

    impl Fixture {
        fn plan(&self, today: NaiveDate) -> StudyPlan {
            let input = PlanInput {
                modules: &self.modules,
                assignments: &self.assignments,
                settings: &self.settings,
                holidays: &self.holidays,
            };
            build_study_plan(&input, today)
        }
    }

    /// A busy term: several modules, overlapping deadlines, a holiday and leave.
    fn busy_term() -> Fixture {
        let modules = vec![
            Module::new(1, "Maths", 5.0, 2).unwrap(),
            Module::new(2, "Physics", 4.0, 1).unwrap(),
            Module::new(3, "History", 3.0, 0).unwrap(),
        ];
        let assignments = vec![
            Assignment::new(1, 1, "Problem Set", date(2025, 3, 10), 10.0, 2.0).unwrap(),
            Assignment::new(2, 2, "Lab Report", date(2025, 3, 5), 6.0, 3.0).unwrap(),
            Assignment::new(3, 3, "Essay", date(2025, 3, 20), 12.5, 4.0).unwrap(),
            Assignment::new(4, 1, "Quiz Prep", date(2025, 3, 5), 2.0, 1.0).unwrap(),
            Assignment::new(5, 2, "Rushed", date(2025, 2, 26), 9.0, 5.0).unwrap(),
        ];
        let mut settings = mwf(4).with_study_day(Weekday::Sat, 3);
        settings.leave_days = 2;
        let holidays = vec![
            BankHoliday::new(date(2025, 3, 3), "Staff Day").selected_with_hours(1),
            BankHoliday::new(date(2025, 3, 7), "Unselected"),
        ];
        Fixture {
            modules,
            assignments,
            settings,
            holidays,
        }
    }

    #[test]
    fn end_to_end_single_assignment_scenario() {
        let fixture = Fixture {
            modules: vec![Module::new(1, "Maths", 5.0, 2).unwrap()],
            assignments: vec![
                Assignment::new(1, 1, "Essay", date(2025, 3, 10), 10.0, 2.0).unwrap(),
            ],
            settings: mwf(4),
            holidays: Vec::new(),
        };

        let plan = fixture.plan(date(2025, 2, 24));

        let placed: Vec<_> = plan
            .entries()
            .map(|(d, e)| (d, e.hours, e.hours_type))
            .collect();
        assert_eq!(
            placed,
            vec![
                (date(2025, 2, 24), 4.0, Some(Phase::Study)),
                (date(2025, 2, 26), 4.0, Some(Phase::Study)),
                (date(2025, 2, 28), 2.0, Some(Phase::Study)),
                (date(2025, 3, 3), 2.0, Some(Phase::Submission)),
            ]
        );
    }

    #[test]
    fn forced_overflow_when_cutoff_already_passed() {
        let today = date(2025, 2, 24);
        let fixture = Fixture {
            modules: vec![Module::new(1, "Maths", 5.0, 5).unwrap()],
            assignments: vec![
                Assignment::new(1, 1, "Quiz", date(2025, 2, 25), 0.0, 3.0).unwrap(),
            ],
            settings: mwf(4),
            holidays: Vec::new(),
        };

        let plan = fixture.plan(today);

        let entries: Vec<_> = plan.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.hours, 3.0);
        assert_eq!(plan.forced.len(), 1);
        assert_eq!(plan.forced[0].reason, ForcedOverflowReason::NoEligibleDay);
    }

    #[test]
    fn every_quota_is_conserved() {
        let fixture = busy_term();
        let plan = fixture.plan(date(2025, 2, 24));

        for assignment in &fixture.assignments {
            let study = plan.total_hours(assignment.id, Phase::Study);
            let submission = plan.total_hours(assignment.id, Phase::Submission);
            assert!(
                (study - assignment.study_hours).abs() < 1e-9,
                "study hours for {} were {study}",
                assignment.name
            );
            assert!(
                (submission - assignment.submission_hours).abs() < 1e-9,
                "submission hours for {} were {submission}",
                assignment.name
            );
        }
    }

    #[test]
    fn capacity_holds_on_days_without_forced_overflow() {
        let fixture = busy_term();
        let today = date(2025, 2, 24);
        let plan = fixture.plan(today);

        let window = PlanningWindow::from_deadlines(
            today,
            fixture.assignments.iter().map(|a| a.due_date),
        );
        let calendar = Calendar::build(window, &fixture.settings, &fixture.holidays);

        let forced_dates: Vec<_> = plan.forced.iter().map(|f| f.date).collect();
        for (date, entries) in &plan.days {
            if forced_dates.contains(date) {
                continue;
            }
            let budget = calendar.day(*date).unwrap().hours_available;
            let used: f64 = entries.iter().map(|e| e.hours).sum();
            assert!(used <= budget + 1e-9, "{date} used {used} of {budget}");
        }
    }

    #[test]
    fn entries_carry_the_day_kind_of_their_date() {
        let fixture = busy_term();
        let plan = fixture.plan(date(2025, 2, 24));

        let kinds: BTreeMap<_, _> = plan
            .entries()
            .map(|(d, e)| (d, e.day_type))
            .collect();
        assert_eq!(kinds.get(&date(2025, 3, 3)), Some(&DayKind::Holiday));
        // First two free weekdays without study hours become leave days.
        assert_eq!(kinds.get(&date(2025, 2, 25)), Some(&DayKind::Leave));
        assert_eq!(kinds.get(&date(2025, 2, 27)), Some(&DayKind::Leave));
    }

    #[test]
    fn earlier_due_dates_are_served_first() {
        let fixture = busy_term();
        let plan = fixture.plan(date(2025, 2, 24));

        let first_day = |id| plan.entries_for(id, Phase::Study).map(|(d, _)| d).next();
        // Rushed (due 2/26) owns the first morning; Problem Set (due 3/10)
        // only starts after the earlier deadlines took their share.
        assert_eq!(first_day(5), Some(date(2025, 2, 24)));
        assert!(first_day(1) > first_day(2));
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let fixture = busy_term();
        let today = date(2025, 2, 24);

        let first = serde_json::to_string(&fixture.plan(today)).unwrap();
        let second = serde_json::to_string(&fixture.plan(today)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn plan_serializes_with_date_keys() {
        let fixture = Fixture {
            modules: vec![Module::new(1, "Maths", 5.0, 0).unwrap()],
            assignments: vec![
                Assignment::new(1, 1, "Essay", date(2025, 2, 24), 1.0, 0.0).unwrap(),
            ],
            settings: mwf(4),
            holidays: Vec::new(),
        };

        let json = serde_json::to_value(fixture.plan(date(2025, 2, 24))).unwrap();
        let entry = &json["days"]["2025-02-24"][0];
        assert_eq!(entry["module"], "Maths - Essay (Study)");
        assert_eq!(entry["day_type"], "regular");
        assert_eq!(entry["hours_type"], "Study");
        assert_eq!(entry["hours_left"], 0.0);
    }

    #[test]
    fn legacy_modules_are_planned_without_phase_data() {
        let fixture = Fixture {
            modules: vec![
                Module::new(1, "History", 2.0, 2)
                    .unwrap()
                    .with_legacy_deadline(date(2025, 3, 10), 3),
            ],
            assignments: Vec::new(),
            settings: mwf(4),
            holidays: Vec::new(),
        };

        let plan = fixture.plan(date(2025, 2, 24));

        let placed: Vec<_> = plan
            .entries()
            .map(|(d, e)| (d, e.module.as_str(), e.hours, e.hours_type))
            .collect();
        assert_eq!(
            placed,
            vec![
                (date(2025, 2, 24), "History", 4.0, None),
                (date(2025, 2, 26), "History", 2.0, None),
            ]
        );
        assert_eq!(plan.days.len(), 2);
    }

    #[test]
    fn no_deadlines_means_empty_plan() {
        let fixture = Fixture {
            modules: vec![Module::new(1, "History", 2.0, 2).unwrap()],
            assignments: Vec::new(),
            settings: mwf(4),
            holidays: Vec::new(),
        };

        assert!(fixture.plan(date(2025, 2, 24)).is_empty());
    }
}
