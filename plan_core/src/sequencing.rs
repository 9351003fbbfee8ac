//! Sequencing engine: structural edits with renumbering.
//!
//! Every operation takes an immutable parent and returns a new, renumbered
//! parent. Ordering fields are rewritten from display position on each
//! change:
//! - workouts: `session_number` 1..=N
//! - moveframes: letters A..Z, AA.. (bijective base 26)
//! - movelaps: `index` 1..=N
//!
//! A failed operation returns an error and leaves nothing modified; the
//! caller still owns the untouched input.

use crate::{Day, EntityKind, Error, Movelap, Moveframe, Result, Week, Workout};
use std::collections::HashSet;
use uuid::Uuid;

/// A day holds at most this many workouts
pub const MAX_WORKOUTS_PER_DAY: usize = 3;

/// A week holds at most this many days
pub const MAX_DAYS_PER_WEEK: usize = 7;

/// Letter sequence for position `i` (0 → "A", 25 → "Z", 26 → "AA", 52 → "BA")
pub fn to_base26_letters(mut i: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (i % 26) as u8));
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    letters.iter().rev().collect()
}

// ============================================================================
// Shared child-list primitives
// ============================================================================

trait Child {
    const KIND: EntityKind;
    fn child_id(&self) -> Uuid;
}

impl Child for Day {
    const KIND: EntityKind = EntityKind::Day;
    fn child_id(&self) -> Uuid {
        self.id
    }
}

impl Child for Workout {
    const KIND: EntityKind = EntityKind::Workout;
    fn child_id(&self) -> Uuid {
        self.id
    }
}

impl Child for Moveframe {
    const KIND: EntityKind = EntityKind::Moveframe;
    fn child_id(&self) -> Uuid {
        self.id
    }
}

impl Child for Movelap {
    const KIND: EntityKind = EntityKind::Movelap;
    fn child_id(&self) -> Uuid {
        self.id
    }
}

fn insert_child<T>(children: &mut Vec<T>, child: T, at: Option<usize>) -> usize {
    let at = at.unwrap_or(children.len()).min(children.len());
    children.insert(at, child);
    at
}

fn remove_child<T: Child>(children: &mut Vec<T>, id: Uuid) -> Result<T> {
    let pos = children
        .iter()
        .position(|c| c.child_id() == id)
        .ok_or_else(|| Error::not_found(T::KIND, id))?;
    Ok(children.remove(pos))
}

fn reorder_children<T: Child + Clone>(children: &[T], ordered: &[Uuid]) -> Result<Vec<T>> {
    let invalid = || Error::InvalidPermutation {
        kind: T::KIND,
        expected: children.len(),
        supplied: ordered.len(),
    };

    if ordered.len() != children.len() {
        return Err(invalid());
    }

    let mut seen = HashSet::with_capacity(ordered.len());
    let mut reordered = Vec::with_capacity(ordered.len());
    for id in ordered {
        if !seen.insert(*id) {
            return Err(invalid());
        }
        let child = children
            .iter()
            .find(|c| c.child_id() == *id)
            .ok_or_else(invalid)?;
        reordered.push(child.clone());
    }
    Ok(reordered)
}

// ============================================================================
// Renumbering
// ============================================================================

fn renumber_workouts(day: &mut Day) {
    for (i, workout) in day.workouts.iter_mut().enumerate() {
        workout.session_number = (i + 1) as u8;
    }
}

fn reletter_moveframes(workout: &mut Workout) {
    for (i, mf) in workout.moveframes.iter_mut().enumerate() {
        mf.letter = to_base26_letters(i);
    }
}

fn reindex_movelaps(moveframe: &mut Moveframe) {
    for (i, lap) in moveframe.movelaps.iter_mut().enumerate() {
        lap.index = (i + 1) as u32;
    }
    moveframe.refresh_totals();
}

/// Rewrite movelap indices and cached totals
pub fn resequence_moveframe(moveframe: &mut Moveframe) {
    reindex_movelaps(moveframe);
}

/// Rewrite letters of a workout's moveframes and everything below them
pub fn resequence_workout(workout: &mut Workout) {
    reletter_moveframes(workout);
    for mf in &mut workout.moveframes {
        resequence_moveframe(mf);
    }
}

/// Rewrite every ordering field in a day's subtree
///
/// Repair path for snapshots that fail validation; does not enforce the
/// workout cap.
pub fn resequence_day(day: &mut Day) {
    renumber_workouts(day);
    for workout in &mut day.workouts {
        resequence_workout(workout);
    }
}

// ============================================================================
// Days
// ============================================================================

/// Insert a day into a week, keeping dated days in date order
pub fn insert_day(week: &Week, mut day: Day) -> Result<Week> {
    if week.days.len() >= MAX_DAYS_PER_WEEK {
        return Err(Error::CapacityExceeded {
            kind: EntityKind::Week,
            capacity: MAX_DAYS_PER_WEEK,
        });
    }
    if let Some(date) = day.date {
        if week.days.iter().any(|d| d.date == Some(date)) {
            return Err(Error::DateOccupied { date });
        }
    }

    resequence_day(&mut day);

    let mut next = week.clone();
    let at = match day.date {
        Some(date) => next
            .days
            .iter()
            .position(|d| d.date.map_or(true, |existing| existing > date)),
        None => None,
    };
    insert_child(&mut next.days, day, at);
    tracing::debug!("Inserted day into week {} ({} days)", next.number, next.days.len());
    Ok(next)
}

/// Remove a day (and its workouts) from a week
pub fn remove_day(week: &Week, day_id: Uuid) -> Result<Week> {
    let mut next = week.clone();
    remove_child(&mut next.days, day_id)?;
    Ok(next)
}

// ============================================================================
// Workouts
// ============================================================================

/// Insert a workout at `at` (tail when `None`) and renumber sessions
pub fn insert_workout(day: &Day, mut workout: Workout, at: Option<usize>) -> Result<Day> {
    if day.workouts.len() >= MAX_WORKOUTS_PER_DAY {
        return Err(Error::CapacityExceeded {
            kind: EntityKind::Day,
            capacity: MAX_WORKOUTS_PER_DAY,
        });
    }

    resequence_workout(&mut workout);

    let mut next = day.clone();
    let pos = insert_child(&mut next.workouts, workout, at);
    renumber_workouts(&mut next);
    tracing::debug!(
        "Inserted workout at position {} of day {} ({} workouts)",
        pos,
        next.id,
        next.workouts.len()
    );
    Ok(next)
}

/// Remove a workout and close the numbering gap
pub fn remove_workout(day: &Day, workout_id: Uuid) -> Result<Day> {
    let mut next = day.clone();
    remove_child(&mut next.workouts, workout_id)?;
    renumber_workouts(&mut next);
    Ok(next)
}

/// Reorder workouts by a full permutation of their ids
pub fn reorder_workouts(day: &Day, ordered_ids: &[Uuid]) -> Result<Day> {
    let mut next = day.clone();
    next.workouts = reorder_children(&day.workouts, ordered_ids)?;
    renumber_workouts(&mut next);
    Ok(next)
}

// ============================================================================
// Moveframes
// ============================================================================

/// Insert a moveframe at `at` (tail when `None`) and reletter
pub fn insert_moveframe(
    workout: &Workout,
    mut moveframe: Moveframe,
    at: Option<usize>,
) -> Result<Workout> {
    resequence_moveframe(&mut moveframe);

    let mut next = workout.clone();
    insert_child(&mut next.moveframes, moveframe, at);
    reletter_moveframes(&mut next);
    Ok(next)
}

pub fn remove_moveframe(workout: &Workout, moveframe_id: Uuid) -> Result<Workout> {
    let mut next = workout.clone();
    remove_child(&mut next.moveframes, moveframe_id)?;
    reletter_moveframes(&mut next);
    Ok(next)
}

pub fn reorder_moveframes(workout: &Workout, ordered_ids: &[Uuid]) -> Result<Workout> {
    let mut next = workout.clone();
    next.moveframes = reorder_children(&workout.moveframes, ordered_ids)?;
    reletter_moveframes(&mut next);
    Ok(next)
}

// ============================================================================
// Movelaps
// ============================================================================

pub fn insert_movelap(
    moveframe: &Moveframe,
    movelap: Movelap,
    at: Option<usize>,
) -> Result<Moveframe> {
    let mut next = moveframe.clone();
    insert_child(&mut next.movelaps, movelap, at);
    reindex_movelaps(&mut next);
    Ok(next)
}

pub fn remove_movelap(moveframe: &Moveframe, movelap_id: Uuid) -> Result<Moveframe> {
    let mut next = moveframe.clone();
    remove_child(&mut next.movelaps, movelap_id)?;
    reindex_movelaps(&mut next);
    Ok(next)
}

pub fn reorder_movelaps(moveframe: &Moveframe, ordered_ids: &[Uuid]) -> Result<Moveframe> {
    let mut next = moveframe.clone();
    next.movelaps = reorder_children(&moveframe.movelaps, ordered_ids)?;
    reindex_movelaps(&mut next);
    Ok(next)
}
