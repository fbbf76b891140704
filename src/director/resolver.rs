//! Assignment resolver
//!
//! One pass per resolver tick:
//! 1. refresh candidate pool availability,
//! 2. revalidate and tick every assigned squad (arrival, lost targets),
//! 3. score every unassigned squad against the pool and commit the best.
//!
//! Squads whose assignment is cleared in step 2 are picked up by step 3 of
//! the same pass; squads that arrived in step 2 settle until the next pass.
//! A stationed squad that picks its own hub again stays put: it keeps its
//! place in the hub and does not depart.
//!
//! Arrival hooks may write world flags mid-pass. Availability that reads a
//! written flag is refreshed on the spot, so later squads in the same pass
//! see the new values (last write wins).

use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::core::config::DirectorConfig;
use crate::core::types::ParticipantId;
use crate::director::events::{ClearReason, DirectorEvent};
use crate::director::lookup::Lookups;
use crate::director::priority::{PriorityEvaluator, ScoringContext};
use crate::director::reach_target::{ActionState, ReachTargetAction, TickOutcome};
use crate::registry::participant::Category;
use crate::registry::pool::ParticipantRegistry;
use crate::rules::condition::ConditionScope;
use crate::rules::faction_rules::FactionRuleTable;
use crate::world::flags::WorldFlags;
use crate::world::objects::WorldObjects;
use crate::world::oracle::{DistanceOracle, WorldClock};

/// Mutable and read-only world state a pass works on
pub struct ResolverWorld<'a> {
    pub registry: &'a mut ParticipantRegistry,
    pub objects: &'a WorldObjects,
    pub flags: &'a mut WorldFlags,
    pub clock: &'a dyn WorldClock,
    pub oracle: &'a dyn DistanceOracle,
}

pub struct AssignmentResolver<'a> {
    evaluator: PriorityEvaluator<'a>,
    config: &'a DirectorConfig,
}

impl<'a> AssignmentResolver<'a> {
    pub fn new(rules: &'a FactionRuleTable, config: &'a DirectorConfig) -> Self {
        Self {
            evaluator: PriorityEvaluator::new(rules, config),
            config,
        }
    }

    pub fn evaluator(&self) -> &PriorityEvaluator<'a> {
        &self.evaluator
    }

    /// Run one full pass and return the resulting events
    pub fn resolve_all(&self, world: &mut ResolverWorld<'_>) -> Vec<DirectorEvent> {
        let mut events = Vec::new();

        let scope = ConditionScope {
            flags: &*world.flags,
            clock: world.clock,
        };
        for (participant, available) in world.registry.refresh_all(&scope) {
            events.push(DirectorEvent::AvailabilityChanged {
                participant,
                available,
            });
        }

        let squads = world.registry.squad_ids();

        let mut settled = Vec::new();
        for &squad in &squads {
            if self.advance_assigned(world, squad, &mut events) {
                settled.push(squad);
            }
        }

        for &squad in &squads {
            if settled.contains(&squad) {
                continue;
            }
            let unassigned = world
                .registry
                .get(squad)
                .and_then(|p| p.as_squad())
                .map(|s| !s.is_assigned())
                .unwrap_or(false);
            if unassigned {
                self.assign(world, squad, &mut events);
            }
        }

        debug_assert!(lifecycle_consistent(world.registry));

        events
    }

    /// Best candidate for a squad; ties go to the earliest registered
    pub fn best_candidate(
        &self,
        registry: &ParticipantRegistry,
        squad: ParticipantId,
        ctx: &ScoringContext<'_>,
    ) -> Option<(ParticipantId, f32)> {
        let subject = registry.get(squad)?;
        let mut best: Option<(ParticipantId, f32)> = None;
        for candidate in registry.candidates() {
            if candidate.id == squad {
                continue;
            }
            let score = self.evaluator.score(subject, candidate, ctx);
            if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate.id, score));
            }
        }
        best
    }

    /// Every eligible candidate with its score, best first
    pub fn rank_candidates(
        &self,
        registry: &ParticipantRegistry,
        squad: ParticipantId,
        ctx: &ScoringContext<'_>,
    ) -> Vec<(ParticipantId, f32)> {
        let Some(subject) = registry.get(squad) else {
            return Vec::new();
        };
        let mut ranked: Vec<(ParticipantId, f32)> = registry
            .candidates()
            .filter(|c| c.id != squad)
            .map(|c| (c.id, self.evaluator.score(subject, c, ctx)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        // stable sort keeps registration order among equal scores
        ranked.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));
        ranked
    }

    fn assign(&self, world: &mut ResolverWorld<'_>, squad: ParticipantId, events: &mut Vec<DirectorEvent>) {
        let ctx = ScoringContext {
            clock: world.clock,
            flags: &*world.flags,
            oracle: world.oracle,
        };
        let Some((target, score)) = self.best_candidate(world.registry, squad, &ctx) else {
            tracing::trace!("Squad {} has no eligible target this pass", squad);
            return;
        };

        let Some(body) = world.registry.get_mut(squad).and_then(|p| p.as_squad_mut()) else {
            return;
        };
        body.action = Some(ReachTargetAction::new(target));
        let departed = match body.stationed_at {
            Some(hub) if hub == target => None,
            _ => body.stationed_at.take(),
        };

        tracing::debug!("Squad {} assigned to {} (score {:.3})", squad, target, score);
        events.push(DirectorEvent::SquadAssigned { squad, target, score });

        // members are travelling now, not stationed
        if let Some(hub) = departed {
            if let Some(hub_body) = world.registry.get_mut(hub).and_then(|p| p.as_hub_mut()) {
                hub_body.occupants.retain(|s| *s != squad);
            }
            self.refresh(world, hub);
            events.push(DirectorEvent::SquadDeparted { squad, hub });
        }
    }

    /// Returns true when the squad arrived on this pass
    fn advance_assigned(
        &self,
        world: &mut ResolverWorld<'_>,
        squad: ParticipantId,
        events: &mut Vec<DirectorEvent>,
    ) -> bool {
        let Some(target) = world
            .registry
            .get(squad)
            .and_then(|p| p.as_squad())
            .and_then(|s| s.assigned_target())
        else {
            return false;
        };

        if world.registry.contains(target) && !self.still_eligible(world, squad, target) {
            self.clear(world, squad, target, ClearReason::TargetIneligible, events);
            return false;
        }

        let Some(participant) = world.registry.get_mut(squad) else {
            return false;
        };
        let placement = participant.placement;
        let Some(body) = participant.as_squad_mut() else {
            return false;
        };
        let under_simulation = body.under_simulation();
        let Some(mut action) = body.action.take() else {
            return false;
        };

        let outcome = {
            let lookups = Lookups::new(world.registry, world.objects);
            action.tick(&placement, lookups.select(under_simulation), self.config, world.oracle)
        };

        match outcome {
            TickOutcome::Traveling => {
                if let Some(body) = world.registry.get_mut(squad).and_then(|p| p.as_squad_mut()) {
                    body.action = Some(action);
                }
            }
            TickOutcome::Arrived => {
                self.on_reached(world, squad, target, events);
                return true;
            }
            TickOutcome::TargetLost => {
                tracing::debug!("Squad {} lost target {}", squad, target);
                events.push(DirectorEvent::AssignmentCleared {
                    squad,
                    target,
                    reason: ClearReason::TargetLost,
                });
            }
            TickOutcome::AlreadyReached => {
                events.push(DirectorEvent::AssignmentCleared {
                    squad,
                    target,
                    reason: ClearReason::Completed,
                });
            }
        }
        false
    }

    fn still_eligible(&self, world: &ResolverWorld<'_>, squad: ParticipantId, target: ParticipantId) -> bool {
        if !world.registry.is_available(target) {
            return false;
        }
        let (Some(subject), Some(candidate)) = (world.registry.get(squad), world.registry.get(target)) else {
            return false;
        };
        let ctx = ScoringContext {
            clock: world.clock,
            flags: &*world.flags,
            oracle: world.oracle,
        };
        self.evaluator.score(subject, candidate, &ctx) > 0.0
    }

    fn clear(
        &self,
        world: &mut ResolverWorld<'_>,
        squad: ParticipantId,
        target: ParticipantId,
        reason: ClearReason,
        events: &mut Vec<DirectorEvent>,
    ) {
        if let Some(body) = world.registry.get_mut(squad).and_then(|p| p.as_squad_mut()) {
            body.action = None;
        }
        tracing::debug!("Squad {} dropped target {} ({:?})", squad, target, reason);
        events.push(DirectorEvent::AssignmentCleared { squad, target, reason });
    }

    /// Arrival bookkeeping: notify the target, bring members online, relocate
    fn on_reached(
        &self,
        world: &mut ResolverWorld<'_>,
        squad: ParticipantId,
        target: ParticipantId,
        events: &mut Vec<DirectorEvent>,
    ) {
        tracing::debug!("Squad {} reached {}", squad, target);

        // 1. the target updates its own occupancy first
        let is_hub = matches!(
            world.registry.get(target).map(|p| p.category()),
            Some(Category::LocationHub(_))
        );
        let mut written = Vec::new();
        if let Some(hub) = world.registry.get_mut(target).and_then(|p| p.as_hub_mut()) {
            if !hub.occupants.contains(&squad) {
                hub.occupants.push(squad);
            }
            for (name, value) in &hub.arrival_flags {
                world.flags.set(name.clone(), *value);
                written.push(name.clone());
            }
        }
        if is_hub {
            self.refresh(world, target);
        }
        events.push(DirectorEvent::TargetReached { squad, target });

        if !written.is_empty() {
            let scope = ConditionScope {
                flags: &*world.flags,
                clock: world.clock,
            };
            for (participant, available) in world.registry.refresh_reading(&written, &scope) {
                events.push(DirectorEvent::AvailabilityChanged {
                    participant,
                    available,
                });
            }
        }

        // 2. offline markers cleared, 3. placement bookkeeping
        let Some(body) = world.registry.get_mut(squad).and_then(|p| p.as_squad_mut()) else {
            return;
        };
        let mut count = 0;
        for member in body.members.iter_mut().filter(|m| m.offline) {
            member.offline = false;
            count += 1;
        }
        let relocated = is_hub && body.stationed_at != Some(target);
        if is_hub {
            body.stationed_at = Some(target);
        }

        if count > 0 {
            events.push(DirectorEvent::MembersOnline { squad, count });
        }
        if relocated {
            events.push(DirectorEvent::SquadRelocated { squad, hub: target });
        }
    }

    fn refresh(&self, world: &mut ResolverWorld<'_>, id: ParticipantId) {
        let scope = ConditionScope {
            flags: &*world.flags,
            clock: world.clock,
        };
        if let Err(e) = world.registry.refresh_availability(id, &scope) {
            tracing::warn!("Could not refresh availability of {}: {}", id, e);
        }
    }
}

/// Post-pass lifecycle check
///
/// Arrived actions are discarded during the pass, so every action left on a
/// squad must still be travelling, and a stationed squad must be listed
/// among its hub's occupants.
fn lifecycle_consistent(registry: &ParticipantRegistry) -> bool {
    registry.iter().all(|p| {
        let Some(squad) = p.as_squad() else {
            return true;
        };
        let travelling = squad
            .current_action()
            .map_or(true, |a| a.state() == ActionState::Traveling);
        let housed = squad.stationed_at.map_or(true, |hub| {
            registry
                .get(hub)
                .and_then(|h| h.as_hub())
                .map_or(true, |h| h.occupants.contains(&p.id))
        });
        travelling && housed
    })
}
