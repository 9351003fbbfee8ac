//! Core domain types for the workout plan hierarchy.
//!
//! This module defines the tree the engines operate on:
//! - Plan → Week → Day → Workout → Moveframe → Movelap
//! - Sports and tolerant numeric quantities
//! - Opaque lookup metadata (periods, workout sections)
//!
//! Ordering fields (`session_number`, `letter`, `index`) are owned by the
//! sequencing engine; callers should never assign them by hand.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Sports
// ============================================================================

/// Sport a moveframe belongs to
///
/// Serialized as a lowercase string; unknown identifiers round-trip through
/// `Other`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub enum Sport {
    Swim,
    Bike,
    Run,
    Row,
    Skate,
    Ski,
    Walk,
    Strength,
    Other(String),
}

impl Sport {
    /// Stable identifier used in files and the sport taxonomy
    pub fn as_str(&self) -> &str {
        match self {
            Sport::Swim => "swim",
            Sport::Bike => "bike",
            Sport::Run => "run",
            Sport::Row => "row",
            Sport::Skate => "skate",
            Sport::Ski => "ski",
            Sport::Walk => "walk",
            Sport::Strength => "strength",
            Sport::Other(id) => id,
        }
    }

    /// Parse a sport identifier, accepting a few common aliases
    pub fn parse(s: &str) -> Sport {
        match s.trim().to_lowercase().as_str() {
            "swim" | "swimming" => Sport::Swim,
            "bike" | "cycling" => Sport::Bike,
            "run" | "running" => Sport::Run,
            "row" | "rowing" => Sport::Row,
            "skate" | "skating" => Sport::Skate,
            "ski" | "skiing" => Sport::Ski,
            "walk" | "walking" => Sport::Walk,
            "strength" | "body_building" | "gym" => Sport::Strength,
            other => Sport::Other(other.to_string()),
        }
    }
}

impl From<String> for Sport {
    fn from(s: String) -> Self {
        Sport::parse(&s)
    }
}

impl From<Sport> for String {
    fn from(sport: Sport) -> Self {
        sport.as_str().to_string()
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Quantities
// ============================================================================

/// A numeric field as it arrives from storage
///
/// Older records and hand-edited files carry numbers as strings, so both
/// shapes are accepted. `value` returns `None` for anything that is not a
/// finite, non-negative number; blank text counts as zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    pub fn value(&self) -> Option<f64> {
        let n = match self {
            Quantity::Number(n) => *n,
            Quantity::Text(s) if s.trim().is_empty() => 0.0,
            Quantity::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (n.is_finite() && n >= 0.0).then_some(n)
    }

    pub fn is_malformed(&self) -> bool {
        self.value().is_none()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Number(0.0)
    }
}

impl From<f64> for Quantity {
    fn from(n: f64) -> Self {
        Quantity::Number(n)
    }
}

impl From<u32> for Quantity {
    fn from(n: u32) -> Self {
        Quantity::Number(f64::from(n))
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Quantity::Text(s.to_string())
    }
}

// ============================================================================
// Movelap and Moveframe
// ============================================================================

/// One repetition unit of a moveframe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Movelap {
    pub id: Uuid,
    /// 1-based position within the moveframe
    pub index: u32,
    /// Meters
    #[serde(default)]
    pub distance: Quantity,
    #[serde(default)]
    pub reps: Quantity,
    /// Seconds, fractions allowed
    #[serde(default)]
    pub time: Quantity,
    #[serde(default)]
    pub pace: Option<String>,
    #[serde(default)]
    pub pause: Option<String>,
    #[serde(default)]
    pub speed_code: Option<String>,
}

impl Movelap {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            index: 0,
            distance: Quantity::default(),
            reps: Quantity::default(),
            time: Quantity::default(),
            pace: None,
            pause: None,
            speed_code: None,
        }
    }

    /// Distance-based lap (meters, seconds)
    pub fn distance(meters: f64, seconds: f64) -> Self {
        Self {
            distance: meters.into(),
            time: seconds.into(),
            ..Self::new()
        }
    }

    /// Repetition-based lap
    pub fn reps(reps: u32) -> Self {
        Self {
            reps: reps.into(),
            ..Self::new()
        }
    }
}

impl Default for Movelap {
    fn default() -> Self {
        Self::new()
    }
}

/// Role of a moveframe inside its workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Main,
    Secondary,
}

/// How a manual moveframe's scalar `distance` is read
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManualInputType {
    #[default]
    Meters,
    Deciseconds,
}

/// One sport-specific exercise block
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Moveframe {
    pub id: Uuid,
    /// A, B, ..., Z, AA, ... in display order
    pub letter: String,
    pub sport: Sport,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub work_type: Option<WorkType>,
    #[serde(default)]
    pub manual_mode: bool,
    #[serde(default)]
    pub manual_input_type: ManualInputType,
    /// Manual-mode scalar total
    #[serde(default)]
    pub distance: Quantity,
    /// Manual-mode repetition count
    #[serde(default)]
    pub repetitions: Quantity,
    /// Repeat-count multiplier for aerobic sports (absent or zero means 1)
    #[serde(default)]
    pub aerobic_series: Option<u32>,
    /// Cached sum of movelap distances
    #[serde(default)]
    pub total_distance: f64,
    /// Cached sum of movelap reps
    #[serde(default)]
    pub total_reps: f64,
    #[serde(default)]
    pub movelaps: Vec<Movelap>,
}

impl Moveframe {
    pub fn new(sport: Sport) -> Self {
        Self {
            id: Uuid::new_v4(),
            letter: String::new(),
            sport,
            description: String::new(),
            work_type: None,
            manual_mode: false,
            manual_input_type: ManualInputType::default(),
            distance: Quantity::default(),
            repetitions: Quantity::default(),
            aerobic_series: None,
            total_distance: 0.0,
            total_reps: 0.0,
            movelaps: Vec::new(),
        }
    }

    /// Manual-mode moveframe carrying scalar totals instead of movelaps
    pub fn manual(sport: Sport, distance: Quantity, repetitions: Quantity) -> Self {
        Self {
            manual_mode: true,
            distance,
            repetitions,
            ..Self::new(sport)
        }
    }

    /// Effective aerobic multiplier
    pub fn series_multiplier(&self) -> u32 {
        match self.aerobic_series {
            Some(n) if n > 0 => n,
            _ => 1,
        }
    }

    /// Totals recomputed from the movelaps; malformed fields count as zero
    pub fn computed_totals(&self) -> (f64, f64) {
        self.movelaps.iter().fold((0.0, 0.0), |(d, r), lap| {
            (
                d + lap.distance.value().unwrap_or(0.0),
                r + lap.reps.value().unwrap_or(0.0),
            )
        })
    }

    /// Rewrite the cached totals from the movelaps
    pub fn refresh_totals(&mut self) {
        if self.manual_mode {
            return;
        }
        let (distance, reps) = self.computed_totals();
        self.total_distance = distance;
        self.total_reps = reps;
    }
}

// ============================================================================
// Workout and Day
// ============================================================================

/// One training session within a day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    /// 1-based, contiguous within the day
    pub session_number: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub section_id: Option<Uuid>,
    #[serde(default)]
    pub is_done: bool,
    /// Percentage of the plan actually completed
    #[serde(default)]
    pub completion_rate: Option<u8>,
    /// Done, but not as planned
    #[serde(default)]
    pub is_different: bool,
    #[serde(default)]
    pub moveframes: Vec<Moveframe>,
}

impl Workout {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            session_number: 0,
            name: None,
            code: None,
            section_id: None,
            is_done: false,
            completion_rate: None,
            is_different: false,
            moveframes: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }
}

impl Default for Workout {
    fn default() -> Self {
        Self::new()
    }
}

/// One calendar date (or template slot) of a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Day {
    pub id: Uuid,
    /// `None` in template plans
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Position within the week for template plans
    #[serde(default)]
    pub slot: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub period_id: Option<Uuid>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

impl Day {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            slot: None,
            notes: String::new(),
            period_id: None,
            workouts: Vec::new(),
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::new(Some(date))
    }
}

// ============================================================================
// Plan containers and lookup metadata
// ============================================================================

/// Opaque training period attached to days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Period {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Opaque workout section label
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSection {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// One week of a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Week {
    pub id: Uuid,
    pub number: u32,
    #[serde(default)]
    pub days: Vec<Day>,
}

impl Week {
    pub fn new(number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            days: Vec::new(),
        }
    }
}

/// Whether days carry real dates
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    #[default]
    Dated,
    Template,
}

/// A training plan snapshot
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub mode: PlanMode,
    #[serde(default)]
    pub weeks: Vec<Week>,
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub sections: Vec<WorkoutSection>,
}

impl Plan {
    pub fn new(name: impl Into<String>, mode: PlanMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mode,
            weeks: Vec::new(),
            periods: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.days().flat_map(|d| d.workouts.iter())
    }

    pub fn week_mut(&mut self, id: Uuid) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|w| w.id == id)
    }

    pub fn day(&self, id: Uuid) -> Option<&Day> {
        self.days().find(|d| d.id == id)
    }

    pub fn day_mut(&mut self, id: Uuid) -> Option<&mut Day> {
        self.weeks
            .iter_mut()
            .flat_map(|w| w.days.iter_mut())
            .find(|d| d.id == id)
    }

    pub fn day_on(&self, date: NaiveDate) -> Option<&Day> {
        self.days().find(|d| d.date == Some(date))
    }

    pub fn workout(&self, id: Uuid) -> Option<&Workout> {
        self.workouts().find(|w| w.id == id)
    }

    pub fn workout_mut(&mut self, id: Uuid) -> Option<&mut Workout> {
        self.weeks
            .iter_mut()
            .flat_map(|w| w.days.iter_mut())
            .flat_map(|d| d.workouts.iter_mut())
            .find(|w| w.id == id)
    }

    pub fn moveframe(&self, id: Uuid) -> Option<&Moveframe> {
        self.workouts()
            .flat_map(|w| w.moveframes.iter())
            .find(|m| m.id == id)
    }

    /// Id of the week holding a day
    pub fn week_of_day(&self, day_id: Uuid) -> Option<Uuid> {
        self.weeks
            .iter()
            .find(|w| w.days.iter().any(|d| d.id == day_id))
            .map(|w| w.id)
    }

    /// Id of the day holding a workout
    pub fn day_of_workout(&self, workout_id: Uuid) -> Option<Uuid> {
        self.days()
            .find(|d| d.workouts.iter().any(|w| w.id == workout_id))
            .map(|d| d.id)
    }

    /// Id of the workout holding a moveframe
    pub fn workout_of_moveframe(&self, moveframe_id: Uuid) -> Option<Uuid> {
        self.workouts()
            .find(|w| w.moveframes.iter().any(|m| m.id == moveframe_id))
            .map(|w| w.id)
    }
}

// ============================================================================
// Fresh identities
// ============================================================================

/// Deep copy with a new id for the entity and every descendant
pub trait Reidentify {
    fn with_fresh_ids(&self) -> Self;
}

impl Reidentify for Movelap {
    fn with_fresh_ids(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

impl Reidentify for Moveframe {
    fn with_fresh_ids(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            movelaps: self.movelaps.iter().map(Reidentify::with_fresh_ids).collect(),
            ..self.clone()
        }
    }
}

impl Reidentify for Workout {
    fn with_fresh_ids(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            moveframes: self
                .moveframes
                .iter()
                .map(Reidentify::with_fresh_ids)
                .collect(),
            ..self.clone()
        }
    }
}

impl Reidentify for Day {
    fn with_fresh_ids(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            workouts: self.workouts.iter().map(Reidentify::with_fresh_ids).collect(),
            ..self.clone()
        }
    }
}
