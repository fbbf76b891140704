//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

pub use glam::Vec2;

/// Stable identifier for a simulation participant (squad, hub or the player)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse world partition (a level). Squads never pursue across regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Behavioural affiliation of a squad, e.g. `"stalker"` or `"bandit"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub String);

impl FactionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// World placement of a participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec2,
    pub region: RegionId,
}

impl Placement {
    pub fn new(position: Vec2, region: RegionId) -> Self {
        Self { position, region }
    }

    pub fn same_region(&self, other: &Placement) -> bool {
        self.region == other.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_ordering() {
        assert!(ParticipantId(1) < ParticipantId(2));
        assert_eq!(ParticipantId::new(7), ParticipantId(7));
        assert_eq!(ParticipantId(7).to_string(), "#7");
    }

    #[test]
    fn test_faction_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<FactionId, &str> = HashMap::new();
        map.insert(FactionId::new("bandit"), "row");
        assert_eq!(map.get(&FactionId::new("bandit")), Some(&"row"));
        assert!(map.get(&FactionId::new("stalker")).is_none());
    }

    #[test]
    fn test_placement_same_region() {
        let a = Placement::new(Vec2::new(0.0, 0.0), RegionId(1));
        let b = Placement::new(Vec2::new(100.0, 0.0), RegionId(1));
        let c = Placement::new(Vec2::new(0.0, 0.0), RegionId(2));
        assert!(a.same_region(&b));
        assert!(!a.same_region(&c));
    }
}
