//! Error types for the plan_core library.

use chrono::NaiveDate;
use std::fmt;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Level of the plan hierarchy an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Plan,
    Week,
    Day,
    Workout,
    Moveframe,
    Movelap,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Plan => "plan",
            EntityKind::Week => "week",
            EntityKind::Day => "day",
            EntityKind::Workout => "workout",
            EntityKind::Moveframe => "moveframe",
            EntityKind::Movelap => "movelap",
        };
        f.write_str(name)
    }
}

/// Core error type for plan_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A container is already holding its maximum number of children
    #[error("{kind} is full: at most {capacity} children allowed")]
    CapacityExceeded { kind: EntityKind, capacity: usize },

    /// Reorder ids are not a permutation of the existing children
    #[error("invalid {kind} order: expected {expected} distinct existing ids, got {supplied}")]
    InvalidPermutation {
        kind: EntityKind,
        expected: usize,
        supplied: usize,
    },

    /// Clipboard payload cannot be hosted by the paste target
    #[error("a {payload} cannot be pasted into a {target}")]
    IncompatibleTarget {
        payload: EntityKind,
        target: EntityKind,
    },

    /// Referenced id is absent from the supplied snapshot
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// Paste requested while the clipboard holds nothing
    #[error("clipboard is empty")]
    EmptyClipboard,

    /// A week already holds a day for this date
    #[error("a day for {date} already exists in this week")]
    DateOccupied { date: NaiveDate },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Error::NotFound { kind, id }
    }
}
