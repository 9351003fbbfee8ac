//! Per-sport and grand totals for workouts, days, weeks and plans.
//!
//! Contribution rules per moveframe:
//! - series-based, manual: series and repetitions both grow by `repetitions`
//! - series-based, standard: one series per movelap, reps and time summed
//! - aerobic, manual: the scalar `distance` is meters or deciseconds
//!   depending on `manual_input_type`, times the aerobic series multiplier
//! - aerobic, standard: movelap distance and time, times the multiplier
//!
//! Durations accumulate as integer deciseconds. Malformed numeric fields
//! contribute zero and are counted in `Aggregate::malformed_fields`; a bad
//! field never fails the aggregation.

use crate::sports::SportTaxonomy;
use crate::{Day, ManualInputType, Moveframe, Plan, Quantity, Sport, Week, Workout};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ops::AddAssign;
use uuid::Uuid;

/// Totals for one sport (or the grand total across sports)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SportTotals {
    /// Distinct workouts containing at least one moveframe of the sport
    pub workout_count: u32,
    pub moveframe_count: u32,
    pub movelap_count: u32,
    pub distance_meters: u64,
    pub duration_deciseconds: u64,
    pub series: u64,
    pub repetitions: u64,
}

impl AddAssign<&SportTotals> for SportTotals {
    /// Saturates instead of overflowing on absurd inputs
    fn add_assign(&mut self, other: &SportTotals) {
        self.workout_count = self.workout_count.saturating_add(other.workout_count);
        self.moveframe_count = self.moveframe_count.saturating_add(other.moveframe_count);
        self.movelap_count = self.movelap_count.saturating_add(other.movelap_count);
        self.distance_meters = self.distance_meters.saturating_add(other.distance_meters);
        self.duration_deciseconds = self
            .duration_deciseconds
            .saturating_add(other.duration_deciseconds);
        self.series = self.series.saturating_add(other.series);
        self.repetitions = self.repetitions.saturating_add(other.repetitions);
    }
}

/// Result of an aggregation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub per_sport: BTreeMap<Sport, SportTotals>,
    pub grand: SportTotals,
    /// Numeric fields that could not be read and counted as zero
    pub malformed_fields: u32,
}

impl Aggregate {
    pub fn sport(&self, sport: &Sport) -> Option<&SportTotals> {
        self.per_sport.get(sport)
    }
}

// ============================================================================
// Accumulation
// ============================================================================

#[derive(Default)]
struct Bucket {
    totals: SportTotals,
    workouts: HashSet<Uuid>,
}

/// Running accumulation; workout ids stay as sets until `finish`
#[derive(Default)]
struct Tally {
    buckets: BTreeMap<Sport, Bucket>,
    malformed: u32,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        for (sport, bucket) in other.buckets {
            let target = self.buckets.entry(sport).or_default();
            target.totals += &bucket.totals;
            target.workouts.extend(bucket.workouts);
        }
        self.malformed = self.malformed.saturating_add(other.malformed);
        self
    }

    fn finish(self) -> Aggregate {
        let mut grand = SportTotals::default();
        let per_sport: BTreeMap<Sport, SportTotals> = self
            .buckets
            .into_iter()
            .map(|(sport, bucket)| {
                let mut totals = bucket.totals;
                totals.workout_count = count(bucket.workouts.len());
                grand += &totals;
                (sport, totals)
            })
            .collect();

        Aggregate {
            per_sport,
            grand,
            malformed_fields: self.malformed,
        }
    }

    /// Read a quantity, counting and logging it when malformed
    fn amount(&mut self, q: &Quantity, field: &str, owner: Uuid) -> f64 {
        match q.value() {
            Some(v) => v,
            None => {
                tracing::warn!(
                    "Ignoring malformed {} {:?} on {}, counted as zero",
                    field,
                    q,
                    owner
                );
                self.malformed = self.malformed.saturating_add(1);
                0.0
            }
        }
    }

    /// Fold one moveframe into its sport's bucket
    ///
    /// Amounts are summed as `f64` across the moveframe's laps and rounded
    /// once, so fractional laps do not drift.
    fn add_moveframe(&mut self, workout_id: Uuid, mf: &Moveframe, taxonomy: &SportTaxonomy) {
        let aerobic = taxonomy.is_aerobic(&mf.sport);
        let mut add = SportTotals {
            moveframe_count: 1,
            ..SportTotals::default()
        };

        match (aerobic, mf.manual_mode) {
            (false, true) => {
                let reps = whole(self.amount(&mf.repetitions, "repetitions", mf.id));
                add.series = reps;
                add.repetitions = reps;
            }
            (false, false) => {
                let (mut reps, mut seconds) = (0.0, 0.0);
                for lap in &mf.movelaps {
                    reps += self.amount(&lap.reps, "reps", lap.id);
                    seconds += self.amount(&lap.time, "time", lap.id);
                }
                add.movelap_count = count(mf.movelaps.len());
                add.series = mf.movelaps.len() as u64;
                add.repetitions = whole(reps);
                add.duration_deciseconds = whole(seconds * 10.0);
            }
            (true, true) => {
                let multiplier = f64::from(mf.series_multiplier());
                let total = whole(self.amount(&mf.distance, "distance", mf.id) * multiplier);
                match mf.manual_input_type {
                    ManualInputType::Meters => add.distance_meters = total,
                    ManualInputType::Deciseconds => add.duration_deciseconds = total,
                }
            }
            (true, false) => {
                let multiplier = f64::from(mf.series_multiplier());
                let (mut meters, mut seconds) = (0.0, 0.0);
                for lap in &mf.movelaps {
                    meters += self.amount(&lap.distance, "distance", lap.id);
                    seconds += self.amount(&lap.time, "time", lap.id);
                }
                add.movelap_count = count(mf.movelaps.len());
                add.distance_meters = whole(meters * multiplier);
                add.duration_deciseconds = whole(seconds * 10.0 * multiplier);
            }
        }

        let bucket = self.buckets.entry(mf.sport.clone()).or_default();
        bucket.totals += &add;
        bucket.workouts.insert(workout_id);
    }
}

/// Round to a whole unit; out-of-range values saturate at `u64::MAX`
fn whole(value: f64) -> u64 {
    value.round() as u64
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn tally_workout(workout: &Workout, taxonomy: &SportTaxonomy) -> Tally {
    let mut tally = Tally::default();
    for mf in &workout.moveframes {
        tally.add_moveframe(workout.id, mf, taxonomy);
    }
    tally
}

fn tally_day(day: &Day, taxonomy: &SportTaxonomy) -> Tally {
    day.workouts
        .iter()
        .map(|w| tally_workout(w, taxonomy))
        .fold(Tally::default(), Tally::merge)
}

// ============================================================================
// Entry points
// ============================================================================

/// Totals for one workout's moveframes
pub fn aggregate_workout(workout: &Workout, taxonomy: &SportTaxonomy) -> Aggregate {
    tally_workout(workout, taxonomy).finish()
}

/// Totals for a day, folded from its workouts
pub fn aggregate_day(day: &Day, taxonomy: &SportTaxonomy) -> Aggregate {
    tally_day(day, taxonomy).finish()
}

pub fn aggregate_week(week: &Week, taxonomy: &SportTaxonomy) -> Aggregate {
    week.days
        .iter()
        .map(|d| tally_day(d, taxonomy))
        .fold(Tally::default(), Tally::merge)
        .finish()
}

pub fn aggregate_plan(plan: &Plan, taxonomy: &SportTaxonomy) -> Aggregate {
    plan.days()
        .map(|d| tally_day(d, taxonomy))
        .fold(Tally::default(), Tally::merge)
        .finish()
}

/// Format deciseconds as `HhMM'SS"d`
pub fn format_deciseconds(ds: u64) -> String {
    let total_seconds = ds / 10;
    let tenths = ds % 10;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}h{:02}'{:02}\"{}", hours, minutes, seconds, tenths)
}
