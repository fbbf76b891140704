//! Target resolution during travel
//!
//! A squad under abstracted simulation resolves its target from the fast
//! participant pool; a fully simulated squad re-resolves it from the
//! authoritative world-object store. Both must agree on identity, category
//! and placement for the same id.

use crate::core::types::{ParticipantId, Placement};
use crate::registry::participant::Category;
use crate::registry::pool::ParticipantRegistry;
use crate::world::objects::WorldObjects;

/// What a travelling squad needs to know about its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub id: ParticipantId,
    pub category: Category,
    pub placement: Placement,
}

pub trait TargetLookup {
    /// `None` when the target no longer exists
    fn resolve(&self, id: ParticipantId) -> Option<TargetView>;
}

/// Reads the in-memory participant pool
pub struct FastPoolLookup<'a> {
    registry: &'a ParticipantRegistry,
}

impl<'a> FastPoolLookup<'a> {
    pub fn new(registry: &'a ParticipantRegistry) -> Self {
        Self { registry }
    }
}

impl TargetLookup for FastPoolLookup<'_> {
    fn resolve(&self, id: ParticipantId) -> Option<TargetView> {
        self.registry.get(id).map(|p| TargetView {
            id: p.id,
            category: p.category(),
            placement: p.placement,
        })
    }
}

/// Reads the authoritative world-object store
pub struct AuthoritativeStoreLookup<'a> {
    objects: &'a WorldObjects,
}

impl<'a> AuthoritativeStoreLookup<'a> {
    pub fn new(objects: &'a WorldObjects) -> Self {
        Self { objects }
    }
}

impl TargetLookup for AuthoritativeStoreLookup<'_> {
    fn resolve(&self, id: ParticipantId) -> Option<TargetView> {
        self.objects.get(id).map(|obj| TargetView {
            id: obj.id,
            category: obj.category,
            placement: obj.placement,
        })
    }
}

/// Both lookups, selected per squad at the call site
pub struct Lookups<'a> {
    pub fast: FastPoolLookup<'a>,
    pub authoritative: AuthoritativeStoreLookup<'a>,
}

impl<'a> Lookups<'a> {
    pub fn new(registry: &'a ParticipantRegistry, objects: &'a WorldObjects) -> Self {
        Self {
            fast: FastPoolLookup::new(registry),
            authoritative: AuthoritativeStoreLookup::new(objects),
        }
    }

    pub fn select(&self, under_simulation: bool) -> &dyn TargetLookup {
        if under_simulation {
            &self.fast
        } else {
            &self.authoritative
        }
    }
}
