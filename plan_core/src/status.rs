//! Workout status derivation.
//!
//! A workout's display status depends only on its completion record and how
//! far its day lies from `today`. Windows are rolling day offsets from
//! `today`, not calendar weeks.

use crate::sequencing::MAX_WORKOUTS_PER_DAY;
use crate::{Day, Workout};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived status of one workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusTag {
    DoneDifferent,
    DonePartial,
    DoneFull,
    MissedPast,
    PlannedCurrentWeek,
    PlannedNextWeek,
    PlannedFuture,
}

impl StatusTag {
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            StatusTag::DoneDifferent | StatusTag::DonePartial | StatusTag::DoneFull
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::DoneDifferent => "DONE_DIFFERENT",
            StatusTag::DonePartial => "DONE_PARTIAL",
            StatusTag::DoneFull => "DONE_FULL",
            StatusTag::MissedPast => "MISSED_PAST",
            StatusTag::PlannedCurrentWeek => "PLANNED_CURRENT_WEEK",
            StatusTag::PlannedNextWeek => "PLANNED_NEXT_WEEK",
            StatusTag::PlannedFuture => "PLANNED_FUTURE",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds used by status derivation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusRules {
    pub partial_threshold: u8,
    pub current_window_days: i64,
    pub next_window_days: i64,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self {
            partial_threshold: 75,
            current_window_days: 7,
            next_window_days: 14,
        }
    }
}

/// Whole days from `today` until `date` (negative once the date has passed)
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

impl StatusRules {
    /// Derive the status of `workout` scheduled on `day`
    ///
    /// Template days have no date and are never considered past.
    pub fn derive(&self, workout: &Workout, day: &Day, today: NaiveDate) -> StatusTag {
        if workout.is_done {
            let rate = workout.completion_rate.unwrap_or(100);
            return if workout.is_different {
                StatusTag::DoneDifferent
            } else if rate < self.partial_threshold {
                StatusTag::DonePartial
            } else {
                StatusTag::DoneFull
            };
        }

        let Some(date) = day.date else {
            return StatusTag::PlannedFuture;
        };

        match days_until(date, today) {
            d if d < 0 => StatusTag::MissedPast,
            d if d <= self.current_window_days => StatusTag::PlannedCurrentWeek,
            d if d <= self.next_window_days => StatusTag::PlannedNextWeek,
            _ => StatusTag::PlannedFuture,
        }
    }

    /// Status per workout slot of a day; empty slots are `None`
    pub fn slots(&self, day: &Day, today: NaiveDate) -> [Option<StatusTag>; MAX_WORKOUTS_PER_DAY] {
        let mut slots = [None; MAX_WORKOUTS_PER_DAY];
        for (slot, workout) in slots.iter_mut().zip(&day.workouts) {
            *slot = Some(self.derive(workout, day, today));
        }
        slots
    }
}

/// Derive a workout's status with the default rules
pub fn derive_workout_status(workout: &Workout, day: &Day, today: NaiveDate) -> StatusTag {
    StatusRules::default().derive(workout, day, today)
}
