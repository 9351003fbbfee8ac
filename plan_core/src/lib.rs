#![forbid(unsafe_code)]

//! Core domain model and engines for workout plans.
//!
//! This crate provides:
//! - Plan hierarchy types (Plan → Week → Day → Workout → Moveframe → Movelap)
//! - Structural validation
//! - Sequencing (session numbers, moveframe letters, movelap indices)
//! - Workout status derivation
//! - Per-sport aggregation
//! - Clipboard transfer (copy/cut/paste)
//! - Plan density classification
//! - Persistence collaborator, config and CSV export
//!
//! Engines are pure functions over snapshots: they take a parent by
//! reference and return a new one, never holding state between calls.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod sports;
pub mod validate;
pub mod sequencing;
pub mod status;
pub mod aggregation;
pub mod transfer;
pub mod classification;
pub mod store;
pub mod report;

// Re-export commonly used types
pub use error::{EntityKind, Error, Result};
pub use types::*;
pub use config::Config;
pub use sports::{build_default_taxonomy, get_default_taxonomy, SportInfo, SportTaxonomy};
pub use validate::{validate_day, validate_moveframe, validate_plan, validate_week, validate_workout, Violation};
pub use status::{derive_workout_status, StatusRules, StatusTag};
pub use aggregation::{aggregate_day, aggregate_plan, aggregate_week, aggregate_workout, format_deciseconds, Aggregate, SportTotals};
pub use transfer::{Clipboard, PasteTarget, Pasted, Payload, TransferMode};
pub use classification::{classify_plan_density, classify_week_density, ColorTier};
pub use store::{JsonFileStore, PlanStore};
