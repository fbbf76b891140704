//! Authoritative world-object store and queries
//!
//! This is the engine's record of what is actually spawned. The participant
//! registry keeps a faster scoring-oriented copy; both are keyed by the same
//! [`ParticipantId`].

use ahash::AHashMap;

use crate::core::types::{ParticipantId, Placement};
use crate::registry::participant::Category;

/// A spawned entity as the world layer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: ParticipantId,
    pub category: Category,
    pub placement: Placement,
}

/// Storage for all spawned world objects
pub struct WorldObjects {
    /// All objects by ID
    objects: AHashMap<ParticipantId, WorldObject>,
}

impl WorldObjects {
    pub fn new() -> Self {
        Self {
            objects: AHashMap::new(),
        }
    }

    /// Add a world object, replacing any previous object with the same id
    pub fn add(&mut self, object: WorldObject) {
        self.objects.insert(object.id, object);
    }

    /// Get an object by ID
    pub fn get(&self, id: ParticipantId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    /// Move an object; returns false if it does not exist
    pub fn relocate(&mut self, id: ParticipantId, placement: Placement) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.placement = placement;
                true
            }
            None => false,
        }
    }

    /// Remove an object
    pub fn remove(&mut self, id: ParticipantId) -> Option<WorldObject> {
        self.objects.remove(&id)
    }

    /// Iterate over all objects
    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for WorldObjects {
    fn default() -> Self {
        Self::new()
    }
}
