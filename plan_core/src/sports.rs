//! Sport taxonomy: which sports aggregate by distance/time and which by
//! series/repetitions.
//!
//! The built-in table is cached; deployments extend or override it through
//! the `[[sports]]` config section.

use crate::config::SportOverride;
use crate::Sport;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default taxonomy - built once and reused across all operations
static DEFAULT_TAXONOMY: Lazy<SportTaxonomy> = Lazy::new(build_default_taxonomy);

/// Per-sport aggregation semantics
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SportInfo {
    /// Distance/time sport; `false` means series-based
    pub is_aerobic: bool,
    pub distance_unit: String,
}

impl SportInfo {
    fn aerobic() -> Self {
        Self {
            is_aerobic: true,
            distance_unit: "m".into(),
        }
    }

    fn series() -> Self {
        Self {
            is_aerobic: false,
            distance_unit: "reps".into(),
        }
    }
}

/// Read-only table mapping sports to their aggregation semantics
#[derive(Clone, Debug)]
pub struct SportTaxonomy {
    entries: HashMap<Sport, SportInfo>,
}

/// Get a reference to the cached default taxonomy
pub fn get_default_taxonomy() -> &'static SportTaxonomy {
    &DEFAULT_TAXONOMY
}

/// Builds the default taxonomy
///
/// **Note**: For production use, prefer `get_default_taxonomy()`.
pub fn build_default_taxonomy() -> SportTaxonomy {
    let mut entries = HashMap::new();

    for sport in [
        Sport::Swim,
        Sport::Bike,
        Sport::Run,
        Sport::Row,
        Sport::Skate,
        Sport::Ski,
        Sport::Walk,
    ] {
        entries.insert(sport, SportInfo::aerobic());
    }
    entries.insert(Sport::Strength, SportInfo::series());

    SportTaxonomy { entries }
}

impl SportTaxonomy {
    /// Semantics for a sport; unknown sports are treated as aerobic meters
    pub fn info(&self, sport: &Sport) -> SportInfo {
        match self.entries.get(sport) {
            Some(info) => info.clone(),
            None => {
                tracing::debug!("Sport '{}' not in taxonomy, treating as aerobic", sport);
                SportInfo::aerobic()
            }
        }
    }

    pub fn is_aerobic(&self, sport: &Sport) -> bool {
        self.entries
            .get(sport)
            .map_or(true, |info| info.is_aerobic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this taxonomy with config entries applied on top
    pub fn with_overrides(&self, overrides: &[SportOverride]) -> SportTaxonomy {
        let mut entries = self.entries.clone();
        for entry in overrides {
            let sport = Sport::parse(&entry.id);
            let fallback = if entry.aerobic { "m" } else { "reps" };
            entries.insert(
                sport,
                SportInfo {
                    is_aerobic: entry.aerobic,
                    distance_unit: entry
                        .distance_unit
                        .clone()
                        .unwrap_or_else(|| fallback.to_string()),
                },
            );
        }
        tracing::debug!("Applied {} sport overrides", overrides.len());
        SportTaxonomy { entries }
    }

    /// Validate the taxonomy for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (sport, info) in &self.entries {
            if sport.as_str().is_empty() {
                errors.push("Sport has empty identifier".to_string());
            }
            if info.distance_unit.trim().is_empty() {
                errors.push(format!("Sport '{}' has empty distance unit", sport));
            }
        }

        if !self.entries.values().any(|i| i.is_aerobic) {
            errors.push("Taxonomy has no aerobic sports".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomy() {
        let taxonomy = build_default_taxonomy();
        assert_eq!(taxonomy.len(), 8);
        assert!(taxonomy.is_aerobic(&Sport::Swim));
        assert!(taxonomy.is_aerobic(&Sport::Row));
        assert!(!taxonomy.is_aerobic(&Sport::Strength));
        assert_eq!(taxonomy.info(&Sport::Run).distance_unit, "m");
    }

    #[test]
    fn test_unknown_sport_is_aerobic() {
        let taxonomy = get_default_taxonomy();
        let canoe = Sport::Other("canoe".into());
        assert!(taxonomy.is_aerobic(&canoe));
        assert_eq!(taxonomy.info(&canoe), SportInfo::aerobic());
    }

    #[test]
    fn test_overrides_extend_and_replace() {
        let overrides = vec![
            SportOverride {
                id: "yoga".into(),
                aerobic: false,
                distance_unit: None,
            },
            SportOverride {
                id: "swim".into(),
                aerobic: true,
                distance_unit: Some("yd".into()),
            },
        ];
        let taxonomy = get_default_taxonomy().with_overrides(&overrides);

        assert!(!taxonomy.is_aerobic(&Sport::Other("yoga".into())));
        assert_eq!(taxonomy.info(&Sport::Swim).distance_unit, "yd");
        assert_eq!(taxonomy.len(), 9);
    }

    #[test]
    fn test_default_taxonomy_validates() {
        let errors = build_default_taxonomy().validate();
        assert!(errors.is_empty(), "Default taxonomy errors: {:?}", errors);
    }

    #[test]
    fn test_empty_unit_is_reported() {
        let taxonomy = build_default_taxonomy().with_overrides(&[SportOverride {
            id: "swim".into(),
            aerobic: true,
            distance_unit: Some(" ".into()),
        }]);
        assert_eq!(taxonomy.validate().len(), 1);
    }
}
