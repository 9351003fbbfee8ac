//! Structural validation of plan snapshots.
//!
//! Validators collect every violation instead of stopping at the first, so
//! callers can choose between rejecting a snapshot and repairing it with
//! the `resequence_*` helpers.

use crate::sequencing::{to_base26_letters, MAX_DAYS_PER_WEEK, MAX_WORKOUTS_PER_DAY};
use crate::{Day, Moveframe, Plan, Week, Workout};
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

/// A broken structural invariant
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("day {day} holds {count} workouts (max {max})", max = MAX_WORKOUTS_PER_DAY)]
    TooManyWorkouts { day: Uuid, count: usize },

    #[error("day {day} has session numbers {found:?}, expected 1..={count}")]
    SessionNumbers { day: Uuid, found: Vec<u8>, count: usize },

    #[error("workout {workout} has letters {found:?}, expected {expected:?}")]
    MoveframeLetters {
        workout: Uuid,
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("moveframe {moveframe} has movelap indices {found:?}, expected 1..={count}")]
    MovelapIndices {
        moveframe: Uuid,
        found: Vec<u32>,
        count: usize,
    },

    #[error("moveframe {moveframe} cached totals disagree with its movelaps")]
    StaleTotals { moveframe: Uuid },

    #[error("week {week} holds {count} days (max {max})", max = MAX_DAYS_PER_WEEK)]
    TooManyDays { week: u32, count: usize },

    #[error("week {week} holds more than one day for {date}")]
    DuplicateDate { week: u32, date: NaiveDate },

    #[error("id {id} is used by more than one entity")]
    DuplicateId { id: Uuid },
}

/// Check movelap indices and cached totals
pub fn validate_moveframe(moveframe: &Moveframe) -> Vec<Violation> {
    let mut violations = Vec::new();

    let found: Vec<u32> = moveframe.movelaps.iter().map(|l| l.index).collect();
    let contiguous = found.iter().enumerate().all(|(i, &idx)| idx == (i + 1) as u32);
    if !contiguous {
        violations.push(Violation::MovelapIndices {
            moveframe: moveframe.id,
            found,
            count: moveframe.movelaps.len(),
        });
    }

    if !moveframe.manual_mode {
        let (distance, reps) = moveframe.computed_totals();
        if distance != moveframe.total_distance || reps != moveframe.total_reps {
            violations.push(Violation::StaleTotals {
                moveframe: moveframe.id,
            });
        }
    }

    violations
}

/// Check moveframe letters, then each moveframe
pub fn validate_workout(workout: &Workout) -> Vec<Violation> {
    let mut violations = Vec::new();

    let found: Vec<String> = workout.moveframes.iter().map(|m| m.letter.clone()).collect();
    let expected: Vec<String> = (0..found.len()).map(to_base26_letters).collect();
    if found != expected {
        violations.push(Violation::MoveframeLetters {
            workout: workout.id,
            found,
            expected,
        });
    }

    for mf in &workout.moveframes {
        violations.extend(validate_moveframe(mf));
    }

    violations
}

/// Check workout capacity and session numbers, then each workout
pub fn validate_day(day: &Day) -> Vec<Violation> {
    let mut violations = Vec::new();

    let count = day.workouts.len();
    if count > MAX_WORKOUTS_PER_DAY {
        violations.push(Violation::TooManyWorkouts { day: day.id, count });
    }

    let found: Vec<u8> = day.workouts.iter().map(|w| w.session_number).collect();
    let contiguous = found.iter().enumerate().all(|(i, &n)| usize::from(n) == i + 1);
    if !contiguous {
        violations.push(Violation::SessionNumbers {
            day: day.id,
            found,
            count,
        });
    }

    for workout in &day.workouts {
        violations.extend(validate_workout(workout));
    }

    violations
}

/// Check day capacity and date uniqueness, then each day
pub fn validate_week(week: &Week) -> Vec<Violation> {
    let mut violations = Vec::new();

    if week.days.len() > MAX_DAYS_PER_WEEK {
        violations.push(Violation::TooManyDays {
            week: week.number,
            count: week.days.len(),
        });
    }

    let mut dates = HashSet::new();
    for date in week.days.iter().filter_map(|d| d.date) {
        if !dates.insert(date) {
            violations.push(Violation::DuplicateDate {
                week: week.number,
                date,
            });
        }
    }

    for day in &week.days {
        violations.extend(validate_day(day));
    }

    violations
}

/// Validate the whole tree, including id uniqueness across all levels
pub fn validate_plan(plan: &Plan) -> Vec<Violation> {
    let mut violations: Vec<Violation> = plan.weeks.iter().flat_map(validate_week).collect();

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut check = |id: Uuid| {
        if !seen.insert(id) && reported.insert(id) {
            violations.push(Violation::DuplicateId { id });
        }
    };

    for week in &plan.weeks {
        check(week.id);
        for day in &week.days {
            check(day.id);
            for workout in &day.workouts {
                check(workout.id);
                for mf in &workout.moveframes {
                    check(mf.id);
                    for lap in &mf.movelaps {
                        check(lap.id);
                    }
                }
            }
        }
    }

    if !violations.is_empty() {
        tracing::debug!("Plan {} has {} violations", plan.id, violations.len());
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::{insert_movelap, insert_moveframe, insert_workout, resequence_day};
    use crate::{Movelap, PlanMode, Sport};

    fn valid_day() -> Day {
        let mut workout = Workout::new();
        let mut mf = Moveframe::new(Sport::Swim);
        mf = insert_movelap(&mf, Movelap::distance(100.0, 60.0), None).unwrap();
        mf = insert_movelap(&mf, Movelap::distance(200.0, 120.0), None).unwrap();
        workout = insert_moveframe(&workout, mf, None).unwrap();
        workout = insert_moveframe(&workout, Moveframe::new(Sport::Run), None).unwrap();
        insert_workout(&Day::new(None), workout, None).unwrap()
    }

    #[test]
    fn test_sequenced_day_is_valid() {
        assert!(validate_day(&valid_day()).is_empty());
    }

    #[test]
    fn test_reports_all_violations() {
        let mut day = valid_day();
        day.workouts[0].session_number = 2;
        day.workouts[0].moveframes[1].letter = "C".into();
        day.workouts[0].moveframes[0].movelaps[1].index = 5;
        day.workouts[0].moveframes[0].total_distance = 999.0;

        let violations = validate_day(&day);
        assert_eq!(violations.len(), 4);
        assert!(matches!(violations[0], Violation::SessionNumbers { .. }));
        assert!(matches!(violations[1], Violation::MoveframeLetters { .. }));
        assert!(matches!(violations[2], Violation::MovelapIndices { .. }));
        assert!(matches!(violations[3], Violation::StaleTotals { .. }));
    }

    #[test]
    fn test_resequence_repairs_day() {
        let mut day = valid_day();
        day.workouts[0].session_number = 7;
        day.workouts[0].moveframes[0].letter = "Q".into();
        day.workouts[0].moveframes[0].movelaps[0].index = 0;
        day.workouts[0].moveframes[0].total_reps = 3.0;
        assert!(!validate_day(&day).is_empty());

        resequence_day(&mut day);
        assert!(validate_day(&day).is_empty());
    }

    #[test]
    fn test_too_many_workouts() {
        let mut day = valid_day();
        for _ in 0..3 {
            day.workouts.push(Workout::new());
        }
        resequence_day(&mut day);

        let violations = validate_day(&day);
        assert_eq!(violations, vec![Violation::TooManyWorkouts { day: day.id, count: 4 }]);
    }

    #[test]
    fn test_manual_moveframe_skips_total_check() {
        let mut mf = Moveframe::manual(Sport::Strength, 0.0.into(), 5u32.into());
        mf.total_reps = 42.0;
        assert!(validate_moveframe(&mf).is_empty());
    }

    #[test]
    fn test_plan_detects_shared_ids_and_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut plan = Plan::new("Test", PlanMode::Dated);
        let mut week = Week::new(1);
        let day = Day::on(date);
        week.days.push(day.clone());
        week.days.push(day);
        plan.weeks.push(week);

        let violations = validate_plan(&plan);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::DuplicateDate { date: d, .. } if *d == date)));
        let dup_ids = violations
            .iter()
            .filter(|v| matches!(v, Violation::DuplicateId { .. }))
            .count();
        assert_eq!(dup_ids, 1);
    }
}
