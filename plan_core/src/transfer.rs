//! Clipboard transfer of days, workouts and moveframes.
//!
//! The clipboard is a single slot moving through
//! `Idle → Holding(Copy|Cut) → Idle`:
//! - `copy`/`cut` store a deep snapshot of the entity
//! - `paste` builds a new plan snapshot with a freshly identified copy
//!   inserted through the sequencing engine; a cut moves the source as it
//!   currently stands in the plan, removing it from its old parent in that
//!   same snapshot
//! - `confirm` is called once the caller has persisted the snapshot and
//!   releases a cut payload; a copy stays held for repeated pasting
//!
//! Until `confirm`, the clipboard is unchanged, so a failed paste or a
//! failed write never loses the source.

use crate::sequencing::{insert_day, insert_moveframe, insert_workout};
use crate::sequencing::{remove_day, remove_moveframe, remove_workout};
use crate::store::PlanStore;
use crate::{Day, EntityKind, Error, Moveframe, Plan, Reidentify, Result, Workout};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity held on the clipboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Payload {
    Day(Day),
    Workout(Workout),
    Moveframe(Moveframe),
}

impl Payload {
    pub fn kind(&self) -> EntityKind {
        match self {
            Payload::Day(_) => EntityKind::Day,
            Payload::Workout(_) => EntityKind::Workout,
            Payload::Moveframe(_) => EntityKind::Moveframe,
        }
    }

    /// Id of the entity the snapshot was taken from
    pub fn source_id(&self) -> Uuid {
        match self {
            Payload::Day(d) => d.id,
            Payload::Workout(w) => w.id,
            Payload::Moveframe(m) => m.id,
        }
    }

    /// Snapshot an entity of `kind` out of a plan
    pub fn find(plan: &Plan, kind: EntityKind, id: Uuid) -> Result<Payload> {
        let found = match kind {
            EntityKind::Day => plan.day(id).cloned().map(Payload::Day),
            EntityKind::Workout => plan.workout(id).cloned().map(Payload::Workout),
            EntityKind::Moveframe => plan.moveframe(id).cloned().map(Payload::Moveframe),
            _ => None,
        };
        found.ok_or(Error::NotFound { kind, id })
    }

    fn with_fresh_ids(&self) -> Payload {
        match self {
            Payload::Day(d) => Payload::Day(d.with_fresh_ids()),
            Payload::Workout(w) => Payload::Workout(w.with_fresh_ids()),
            Payload::Moveframe(m) => Payload::Moveframe(m.with_fresh_ids()),
        }
    }
}

impl From<Day> for Payload {
    fn from(day: Day) -> Self {
        Payload::Day(day)
    }
}

impl From<Workout> for Payload {
    fn from(workout: Workout) -> Self {
        Payload::Workout(workout)
    }
}

impl From<Moveframe> for Payload {
    fn from(moveframe: Moveframe) -> Self {
        Payload::Moveframe(moveframe)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    Copy,
    Cut,
}

/// Where a payload should land
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteTarget {
    /// Hosts a day; `date` re-dates the pasted day
    Week { id: Uuid, date: Option<NaiveDate> },
    /// Hosts a workout at `at` (tail when `None`)
    Day { id: Uuid, at: Option<usize> },
    /// Hosts a moveframe at `at` (tail when `None`)
    Workout { id: Uuid, at: Option<usize> },
}

impl PasteTarget {
    pub fn kind(&self) -> EntityKind {
        match self {
            PasteTarget::Week { .. } => EntityKind::Week,
            PasteTarget::Day { .. } => EntityKind::Day,
            PasteTarget::Workout { .. } => EntityKind::Workout,
        }
    }

    fn accepts(&self, payload: EntityKind) -> bool {
        matches!(
            (self, payload),
            (PasteTarget::Week { .. }, EntityKind::Day)
                | (PasteTarget::Day { .. }, EntityKind::Workout)
                | (PasteTarget::Workout { .. }, EntityKind::Moveframe)
        )
    }
}

/// Result of a successful paste, not yet confirmed
#[derive(Clone, Debug)]
pub struct Pasted {
    /// New plan snapshot to persist
    pub plan: Plan,
    /// Id of the inserted copy
    pub pasted_id: Uuid,
    pub mode: TransferMode,
    /// Source removed from its old parent (cut only)
    pub removed_source: Option<Uuid>,
}

/// Single-slot clipboard
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Clipboard {
    #[default]
    Idle,
    Holding {
        payload: Payload,
        mode: TransferMode,
    },
}

impl Clipboard {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Clipboard::Idle)
    }

    pub fn held(&self) -> Option<(&Payload, TransferMode)> {
        match self {
            Clipboard::Idle => None,
            Clipboard::Holding { payload, mode } => Some((payload, *mode)),
        }
    }

    /// Hold a snapshot for pasting, replacing anything held
    pub fn copy(&mut self, entity: impl Into<Payload>) {
        self.hold(entity.into(), TransferMode::Copy);
    }

    /// Hold a snapshot whose source is removed on paste
    pub fn cut(&mut self, entity: impl Into<Payload>) {
        self.hold(entity.into(), TransferMode::Cut);
    }

    fn hold(&mut self, payload: Payload, mode: TransferMode) {
        tracing::debug!(
            "Clipboard holding {} {} ({:?})",
            payload.kind(),
            payload.source_id(),
            mode
        );
        *self = Clipboard::Holding { payload, mode };
    }

    /// Build the snapshot with the held payload pasted into `target`
    ///
    /// For a cut, the source is removed before the insert, so `at`
    /// positions refer to the target's children without the source.
    pub fn paste(&self, plan: &Plan, target: PasteTarget) -> Result<Pasted> {
        let (payload, mode) = self.held().ok_or(Error::EmptyClipboard)?;

        if !target.accepts(payload.kind()) {
            return Err(Error::IncompatibleTarget {
                payload: payload.kind(),
                target: target.kind(),
            });
        }

        let mut next = plan.clone();
        let (moved, removed_source) = match mode {
            TransferMode::Copy => (payload.with_fresh_ids(), None),
            TransferMode::Cut => {
                // Edits made to the source since the cut travel with it
                let current = Payload::find(plan, payload.kind(), payload.source_id())?;
                remove_source(&mut next, payload)?;
                (current.with_fresh_ids(), Some(payload.source_id()))
            }
        };

        let pasted_id = insert_payload(&mut next, moved, target)?;

        tracing::debug!(
            "Pasted {} as {} into {} ({:?})",
            payload.kind(),
            pasted_id,
            target.kind(),
            mode
        );

        Ok(Pasted {
            plan: next,
            pasted_id,
            mode,
            removed_source,
        })
    }

    /// Acknowledge that a pasted snapshot was persisted
    pub fn confirm(&mut self, pasted: &Pasted) {
        if pasted.mode == TransferMode::Cut {
            if let Clipboard::Holding {
                mode: TransferMode::Cut,
                ..
            } = self
            {
                tracing::debug!("Cut of {:?} committed, clipboard idle", pasted.removed_source);
                *self = Clipboard::Idle;
            }
        }
    }

    /// Paste into the store's plan, persist, then confirm
    pub fn paste_into_store<S: PlanStore>(
        &mut self,
        store: &mut S,
        target: PasteTarget,
    ) -> Result<Pasted> {
        let plan = store.load()?;
        let pasted = self.paste(&plan, target)?;
        store.save(&pasted.plan)?;
        self.confirm(&pasted);
        Ok(pasted)
    }
}

fn remove_source(plan: &mut Plan, payload: &Payload) -> Result<()> {
    let id = payload.source_id();
    let missing = || Error::NotFound {
        kind: payload.kind(),
        id,
    };

    match payload {
        Payload::Day(_) => {
            let week_id = plan.week_of_day(id).ok_or_else(missing)?;
            let week = plan.week_mut(week_id).ok_or_else(missing)?;
            *week = remove_day(week, id)?;
        }
        Payload::Workout(_) => {
            let day_id = plan.day_of_workout(id).ok_or_else(missing)?;
            let day = plan.day_mut(day_id).ok_or_else(missing)?;
            *day = remove_workout(day, id)?;
        }
        Payload::Moveframe(_) => {
            let workout_id = plan.workout_of_moveframe(id).ok_or_else(missing)?;
            let workout = plan.workout_mut(workout_id).ok_or_else(missing)?;
            *workout = remove_moveframe(workout, id)?;
        }
    }
    Ok(())
}

fn insert_payload(plan: &mut Plan, payload: Payload, target: PasteTarget) -> Result<Uuid> {
    let pasted_id = payload.source_id();

    match (payload, target) {
        (Payload::Day(mut day), PasteTarget::Week { id, date }) => {
            let week = plan.week_mut(id).ok_or(Error::NotFound {
                kind: EntityKind::Week,
                id,
            })?;
            if date.is_some() {
                day.date = date;
            }
            *week = insert_day(week, day)?;
        }
        (Payload::Workout(workout), PasteTarget::Day { id, at }) => {
            let day = plan.day_mut(id).ok_or(Error::NotFound {
                kind: EntityKind::Day,
                id,
            })?;
            *day = insert_workout(day, workout, at)?;
        }
        (Payload::Moveframe(mf), PasteTarget::Workout { id, at }) => {
            let workout = plan.workout_mut(id).ok_or(Error::NotFound {
                kind: EntityKind::Workout,
                id,
            })?;
            *workout = insert_moveframe(workout, mf, at)?;
        }
        (payload, target) => {
            return Err(Error::IncompatibleTarget {
                payload: payload.kind(),
                target: target.kind(),
            })
        }
    }

    Ok(pasted_id)
}
