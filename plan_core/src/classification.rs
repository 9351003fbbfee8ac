//! Plan density classification.
//!
//! Counts distinct workouts that hold at least one moveframe and maps the
//! count onto a fixed color scale. Recomputed from scratch on every call.

use crate::{Plan, Week, Workout};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// At-a-glance density color
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    Red,
    LightGrey,
    LightYellow,
    Yellow,
    LightGreen,
    Green,
    DarkGreen,
    Blue,
}

impl ColorTier {
    /// Tier for a number of non-empty workouts
    pub fn for_count(count: usize) -> ColorTier {
        match count {
            0 => ColorTier::Red,
            1 => ColorTier::LightGrey,
            2 => ColorTier::LightYellow,
            3 => ColorTier::Yellow,
            4 => ColorTier::LightGreen,
            5 => ColorTier::Green,
            6 => ColorTier::DarkGreen,
            _ => ColorTier::Blue,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTier::Red => "red",
            ColorTier::LightGrey => "light-grey",
            ColorTier::LightYellow => "light-yellow",
            ColorTier::Yellow => "yellow",
            ColorTier::LightGreen => "light-green",
            ColorTier::Green => "green",
            ColorTier::DarkGreen => "dark-green",
            ColorTier::Blue => "blue",
        }
    }
}

impl fmt::Display for ColorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn count_active<'a>(workouts: impl Iterator<Item = &'a Workout>) -> usize {
    workouts
        .filter(|w| !w.moveframes.is_empty())
        .map(|w| w.id)
        .collect::<HashSet<Uuid>>()
        .len()
}

/// Distinct workouts with at least one moveframe, across all weeks
pub fn active_workout_count(plan: &Plan) -> usize {
    count_active(plan.workouts())
}

pub fn classify_plan_density(plan: &Plan) -> ColorTier {
    ColorTier::for_count(active_workout_count(plan))
}

/// Same thresholds applied to a single week
pub fn classify_week_density(week: &Week) -> ColorTier {
    ColorTier::for_count(count_active(
        week.days.iter().flat_map(|d| d.workouts.iter()),
    ))
}
