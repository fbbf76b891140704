//! Director configuration with documented constants
//!
//! All magic numbers used by scoring, arrival detection and the resolver
//! cadence are collected here. The config is built once at startup and
//! handed to the director; nothing reads it through a global.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{DirectorError, Result};

/// Configuration for the simulation director
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    // === SCORING ===
    /// Score granted to any pairing that passes the rule gate and region check
    ///
    /// Weighted terms are added on top of this before distance falloff.
    pub base_score: f32,

    /// Lower clamp applied to distance before the inverse falloff
    ///
    /// A squad standing on its target gets `1 + 1 / min_distance`, which is
    /// the maximal multiplier (2.0 at the default of 1.0).
    pub min_distance: f32,

    // === ARRIVAL ===
    /// Squared distance within which a squad counts as arrived at a hub
    pub hub_arrival_distance_sq: f32,

    /// Linear distance at which a squad has caught up with a rival squad
    pub engage_distance: f32,

    /// Linear distance at which a squad has made contact with the player
    pub player_contact_distance: f32,

    // === CADENCE ===
    /// Run the assignment resolver once every N ticks
    ///
    /// At 1 every tick resolves. Larger values trade reaction time for cost.
    pub resolve_interval: u64,

    /// Ticks per simulated day, drives the hour-of-day seen by rules
    ///
    /// At 1440 one tick is one simulated minute.
    pub ticks_per_day: u64,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            base_score: 3.0,
            min_distance: 1.0,

            hub_arrival_distance_sq: 25.0,
            engage_distance: 10.0,
            player_contact_distance: 10.0,

            resolve_interval: 1,
            ticks_per_day: 1440,
        }
    }
}

impl DirectorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DirectorConfig = toml::from_str(content)?;
        config.validate().map_err(DirectorError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_distance <= 0.0 {
            return Err(format!(
                "min_distance ({}) must be positive to keep the falloff finite",
                self.min_distance
            ));
        }

        if self.base_score <= 0.0 {
            return Err(format!(
                "base_score ({}) must be positive so eligible pairings never score 0",
                self.base_score
            ));
        }

        if self.hub_arrival_distance_sq < 0.0
            || self.engage_distance < 0.0
            || self.player_contact_distance < 0.0
        {
            return Err("Arrival distances must not be negative".into());
        }

        if self.resolve_interval == 0 {
            return Err("resolve_interval must be at least 1".into());
        }

        if self.ticks_per_day == 0 {
            return Err("ticks_per_day must be at least 1".into());
        }

        Ok(())
    }
}

/// Load the director config from a TOML file
pub fn load_config(path: &Path) -> Result<DirectorConfig> {
    let content = std::fs::read_to_string(path)?;
    DirectorConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DirectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DirectorConfig::from_toml_str("resolve_interval = 5\n").unwrap();
        assert_eq!(config.resolve_interval, 5);
        assert!((config.base_score - 3.0).abs() < f32::EPSILON);
        assert_eq!(config.ticks_per_day, 1440);
    }

    #[test]
    fn test_zero_min_distance_rejected() {
        let err = DirectorConfig::from_toml_str("min_distance = 0.0\n").unwrap_err();
        assert!(matches!(err, DirectorError::Config(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = DirectorConfig {
            resolve_interval: 0,
            ..DirectorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
