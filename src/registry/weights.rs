//! Static weight rows
//!
//! Target-side weights and squad behaviour coefficients are loaded once from
//! configuration. Entity-specific rows win; otherwise squads fall back to the
//! generic `squad` row, the player to `actor` and hubs to `default`.

use ahash::AHashMap;

use crate::registry::participant::Category;

/// Named coefficient -> weight
pub type Weights = AHashMap<String, f32>;

pub const DEFAULT_ROW: &str = "default";
pub const SQUAD_ROW: &str = "squad";
pub const ACTOR_ROW: &str = "actor";

/// Fallback row for a participant category
pub fn fallback_row(category: Category) -> &'static str {
    match category {
        Category::Squad => SQUAD_ROW,
        Category::Player => ACTOR_ROW,
        Category::LocationHub(_) => DEFAULT_ROW,
    }
}

/// Build a weight map from `(name, value)` pairs
pub fn weights<'a>(pairs: impl IntoIterator<Item = (&'a str, f32)>) -> Weights {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Sparse dot product; names missing on either side contribute 0
///
/// Terms are summed in name order so the result does not depend on map
/// iteration order.
pub fn sparse_dot(subject: &Weights, target: &Weights) -> f32 {
    let mut terms: Vec<(&str, f32)> = subject
        .iter()
        .filter_map(|(name, w)| target.get(name).map(|t| (name.as_str(), w * t)))
        .collect();
    terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
    terms.iter().map(|(_, term)| term).sum()
}

/// All static weight rows
#[derive(Debug, Clone, Default)]
pub struct WeightTables {
    target: AHashMap<String, Weights>,
    behaviour: AHashMap<String, Weights>,
}

impl WeightTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_target_row(&mut self, profile: impl Into<String>, row: Weights) {
        self.target.insert(profile.into(), row);
    }

    pub fn insert_behaviour_row(&mut self, profile: impl Into<String>, row: Weights) {
        self.behaviour.insert(profile.into(), row);
    }

    /// Target-side weights for a profile, with the category fallback
    pub fn target_weights(&self, profile: &str, category: Category) -> Weights {
        self.target
            .get(profile)
            .or_else(|| self.target.get(fallback_row(category)))
            .cloned()
            .unwrap_or_default()
    }

    /// Behaviour coefficients for a squad profile, falling back to `squad`
    pub fn behaviour_weights(&self, profile: &str) -> Weights {
        self.behaviour
            .get(profile)
            .or_else(|| self.behaviour.get(SQUAD_ROW))
            .cloned()
            .unwrap_or_default()
    }

    pub fn target_rows(&self) -> usize {
        self.target.len()
    }

    pub fn behaviour_rows(&self) -> usize {
        self.behaviour.len()
    }
}
