//! Participant registry and candidate pool
//!
//! Holds every participant keyed by id in registration order. Weights are
//! resolved once at registration; availability is recomputed on demand and
//! decides candidate pool membership. An unavailable participant stays
//! registered, it just cannot be picked as a target.

use ahash::AHashMap;

use crate::core::error::{DirectorError, Result};
use crate::core::types::ParticipantId;
use crate::registry::participant::{Body, Participant};
use crate::registry::weights::WeightTables;
use crate::rules::condition::AvailabilityConditions;
use crate::world::flags::FlagQuery;

struct Entry {
    participant: Participant,
    /// Registration sequence number, used for deterministic tie-breaking
    seq: u64,
    available: bool,
}

pub struct ParticipantRegistry {
    entries: AHashMap<ParticipantId, Entry>,
    /// Ids in registration order
    order: Vec<ParticipantId>,
    next_seq: u64,
    weights: WeightTables,
    availability: AvailabilityConditions,
}

impl ParticipantRegistry {
    pub fn new(weights: WeightTables, availability: AvailabilityConditions) -> Self {
        Self {
            entries: AHashMap::new(),
            order: Vec::new(),
            next_seq: 0,
            weights,
            availability,
        }
    }

    /// Register a participant, resolving its static rows, then refresh its availability
    pub fn register(&mut self, mut participant: Participant, flags: &dyn FlagQuery) -> Result<bool> {
        let id = participant.id;
        if self.entries.contains_key(&id) {
            return Err(DirectorError::DuplicateParticipant(id));
        }

        participant.weights = self
            .weights
            .target_weights(&participant.profile, participant.category());
        if participant.condition.is_none() {
            participant.condition = self.availability.get(&participant.profile).cloned();
        }
        let profile = participant.profile.clone();
        if let Body::Squad(squad) = &mut participant.body {
            squad.behaviour = self.weights.behaviour_weights(&profile);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            id,
            Entry {
                participant,
                seq,
                available: false,
            },
        );
        self.order.push(id);

        tracing::debug!("Registered participant {} (seq {})", id, seq);
        self.refresh_availability(id, flags)
    }

    /// Re-evaluate the availability condition and the engine-level check
    ///
    /// Returns the new availability.
    pub fn refresh_availability(&mut self, id: ParticipantId, flags: &dyn FlagQuery) -> Result<bool> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(DirectorError::ParticipantNotFound(id))?;

        let participant = &entry.participant;
        let condition_ok = participant
            .condition
            .as_ref()
            .map(|cond| cond.eval(flags))
            .unwrap_or(true);
        let available = condition_ok && participant.engine_available();

        if available != entry.available {
            tracing::trace!("Participant {} availability -> {}", id, available);
        }
        entry.available = available;
        Ok(available)
    }

    /// Refresh everyone; returns the participants whose availability flipped
    pub fn refresh_all(&mut self, flags: &dyn FlagQuery) -> Vec<(ParticipantId, bool)> {
        let ids = self.order.clone();
        self.refresh_ids(ids, flags)
    }

    /// Refresh the participants whose availability condition reads one of `names`
    ///
    /// Returns the participants whose availability flipped, in registration order.
    pub fn refresh_reading(&mut self, names: &[String], flags: &dyn FlagQuery) -> Vec<(ParticipantId, bool)> {
        let ids: Vec<ParticipantId> = self
            .iter()
            .filter(|p| {
                p.condition.as_ref().is_some_and(|cond| {
                    cond.referenced_flags()
                        .iter()
                        .any(|flag| names.iter().any(|name| name.as_str() == *flag))
                })
            })
            .map(|p| p.id)
            .collect();
        self.refresh_ids(ids, flags)
    }

    fn refresh_ids(&mut self, ids: Vec<ParticipantId>, flags: &dyn FlagQuery) -> Vec<(ParticipantId, bool)> {
        let mut flipped = Vec::new();
        for id in ids {
            let before = self.is_available(id);
            if let Ok(after) = self.refresh_availability(id, flags) {
                if before != after {
                    flipped.push((id, after));
                }
            }
        }
        flipped
    }

    /// Remove a participant entirely
    ///
    /// Squads still targeting it are not touched here; the resolver notices
    /// the missing target on their next tick.
    pub fn unregister(&mut self, id: ParticipantId) -> Option<Participant> {
        let entry = self.entries.remove(&id)?;
        self.order.retain(|other| *other != id);
        tracing::debug!("Unregistered participant {}", id);
        Some(entry.participant)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.entries.get(&id).map(|e| &e.participant)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.entries.get_mut(&id).map(|e| &mut e.participant)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn is_available(&self, id: ParticipantId) -> bool {
        self.entries.get(&id).map(|e| e.available).unwrap_or(false)
    }

    pub fn seq(&self, id: ParticipantId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.seq)
    }

    /// Manually override one target-side weight after load
    pub fn override_weight(&mut self, id: ParticipantId, name: impl Into<String>, value: f32) -> Result<()> {
        let participant = self
            .get_mut(id)
            .ok_or(DirectorError::ParticipantNotFound(id))?;
        participant.weights.insert(name.into(), value);
        Ok(())
    }

    /// Every participant in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    /// The candidate pool, in registration order
    pub fn candidates(&self) -> impl Iterator<Item = &Participant> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|e| e.available)
            .map(|e| &e.participant)
    }

    /// Squad ids in registration order
    pub fn squad_ids(&self) -> Vec<ParticipantId> {
        self.iter()
            .filter(|p| p.as_squad().is_some())
            .map(|p| p.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self::new(WeightTables::default(), AvailabilityConditions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, Placement, RegionId, Vec2};
    use crate::registry::participant::HubKind;
    use crate::registry::weights::{weights, DEFAULT_ROW, SQUAD_ROW};
    use crate::rules::condition::Condition;
    use crate::world::flags::WorldFlags;

    fn place() -> Placement {
        Placement::new(Vec2::ZERO, RegionId(1))
    }

    fn hub(id: u32, profile: &str) -> Participant {
        Participant::hub(ParticipantId(id), profile, HubKind::Base, place(), 2)
    }

    #[test]
    fn test_register_resolves_weights() {
        let mut tables = WeightTables::new();
        tables.insert_target_row(DEFAULT_ROW, weights([("base", 1.0)]));
        tables.insert_behaviour_row(SQUAD_ROW, weights([("base", 2.0)]));
        let mut registry = ParticipantRegistry::new(tables, AvailabilityConditions::new());
        let flags = WorldFlags::new();

        registry.register(hub(1, "camp"), &flags).unwrap();
        registry
            .register(
                Participant::squad(ParticipantId(2), "loners", FactionId::new("stalker"), place(), 3),
                &flags,
            )
            .unwrap();

        assert_eq!(registry.get(ParticipantId(1)).unwrap().weights.get("base"), Some(&1.0));
        let squad = registry.get(ParticipantId(2)).unwrap().as_squad().unwrap();
        assert_eq!(squad.behaviour.get("base"), Some(&2.0));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ParticipantRegistry::default();
        let flags = WorldFlags::new();
        registry.register(hub(1, "camp"), &flags).unwrap();
        let err = registry.register(hub(1, "camp"), &flags).unwrap_err();
        assert!(matches!(err, DirectorError::DuplicateParticipant(ParticipantId(1))));
    }

    #[test]
    fn test_condition_controls_pool_membership() {
        let mut conditions = AvailabilityConditions::new();
        conditions.insert("bridge_camp", Condition::parse("bridge_open").unwrap());
        let mut registry = ParticipantRegistry::new(WeightTables::new(), conditions);
        let mut flags = WorldFlags::new();

        assert!(!registry.register(hub(1, "bridge_camp"), &flags).unwrap());
        assert!(registry.contains(ParticipantId(1)));
        assert_eq!(registry.candidates().count(), 0);

        flags.set("bridge_open", true);
        let flipped = registry.refresh_all(&flags);
        assert_eq!(flipped, vec![(ParticipantId(1), true)]);
        assert_eq!(registry.candidates().count(), 1);
    }

    #[test]
    fn test_refresh_reading_only_touches_dependents() {
        let mut conditions = AvailabilityConditions::new();
        conditions.insert("bridge_camp", Condition::parse("!bridge_blown").unwrap());
        conditions.insert("ford_camp", Condition::parse("ford_dry").unwrap());
        let mut registry = ParticipantRegistry::new(WeightTables::new(), conditions);
        let mut flags = WorldFlags::new();
        flags.set("ford_dry", true);
        registry.register(hub(1, "bridge_camp"), &flags).unwrap();
        registry.register(hub(2, "ford_camp"), &flags).unwrap();

        flags.set("bridge_blown", true);
        flags.set("ford_dry", false);
        let flipped = registry.refresh_reading(&["bridge_blown".to_string()], &flags);
        assert_eq!(flipped, vec![(ParticipantId(1), false)]);
        // ford camp reads a different flag and keeps its stale value
        assert!(registry.is_available(ParticipantId(2)));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ParticipantRegistry::default();
        let flags = WorldFlags::new();
        for id in [5, 2, 9] {
            registry.register(hub(id, "camp"), &flags).unwrap();
        }

        let ids: Vec<_> = registry.candidates().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![5, 2, 9]);
        assert!(registry.seq(ParticipantId(5)) < registry.seq(ParticipantId(9)));

        registry.unregister(ParticipantId(2));
        let ids: Vec<_> = registry.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![5, 9]);
        assert!(registry.unregister(ParticipantId(2)).is_none());
    }

    #[test]
    fn test_override_weight() {
        let mut registry = ParticipantRegistry::default();
        registry.register(hub(1, "camp"), &WorldFlags::new()).unwrap();
        registry.override_weight(ParticipantId(1), "base", 7.5).unwrap();
        assert_eq!(registry.get(ParticipantId(1)).unwrap().weights.get("base"), Some(&7.5));

        assert!(registry.override_weight(ParticipantId(42), "base", 1.0).is_err());
    }

    #[test]
    fn test_refresh_unknown_participant() {
        let mut registry = ParticipantRegistry::default();
        let err = registry
            .refresh_availability(ParticipantId(3), &WorldFlags::new())
            .unwrap_err();
        assert!(matches!(err, DirectorError::ParticipantNotFound(_)));
    }
}
