//! Simulation director: scores targets for squads, assigns the best one and
//! drives each squad's travel action to arrival.
//!
//! [`Director`] owns every piece of state the engine needs (registry,
//! authoritative object store, world flags, clock) and exposes the inbound
//! interface the host game calls. One [`Director::tick`] per simulation
//! step; resolver passes return [`DirectorEvent`]s for the host to act on.

pub mod events;
pub mod lookup;
pub mod persistence;
pub mod priority;
pub mod reach_target;
pub mod resolver;

pub use events::{ClearReason, DirectorEvent};
pub use lookup::{AuthoritativeStoreLookup, FastPoolLookup, Lookups, TargetLookup, TargetView};
pub use persistence::{SavedAssignments, SquadRecord, SquadSaveState};
pub use priority::{PriorityEvaluator, ScoringContext};
pub use reach_target::{has_arrived, ActionState, ReachTargetAction, TickOutcome};
pub use resolver::{AssignmentResolver, ResolverWorld};

use crate::core::clock::SimClock;
use crate::core::config::DirectorConfig;
use crate::core::error::{DirectorError, Result};
use crate::core::types::{ParticipantId, Placement, RegionId, Vec2};
use crate::registry::participant::{Body, Participant, SquadBody};
use crate::registry::pool::ParticipantRegistry;
use crate::rules::condition::ConditionScope;
use crate::rules::faction_rules::FactionRuleTable;
use crate::rules::loader::DirectorRules;
use crate::world::flags::WorldFlags;
use crate::world::objects::{WorldObject, WorldObjects};
use crate::world::oracle::{DistanceOracle, EuclideanDistance};

pub struct Director {
    config: DirectorConfig,
    rules: FactionRuleTable,
    registry: ParticipantRegistry,
    objects: WorldObjects,
    flags: WorldFlags,
    clock: SimClock,
    oracle: Box<dyn DistanceOracle>,
}

impl Director {
    pub fn new(config: DirectorConfig, rules: DirectorRules) -> Result<Self> {
        config.validate().map_err(DirectorError::Config)?;
        let DirectorRules {
            factions,
            weights,
            availability,
        } = rules;

        Ok(Self {
            clock: SimClock::new(config.ticks_per_day),
            config,
            rules: factions,
            registry: ParticipantRegistry::new(weights, availability),
            objects: WorldObjects::new(),
            flags: WorldFlags::new(),
            oracle: Box::new(EuclideanDistance),
        })
    }

    /// Replace the default straight-line distance oracle
    pub fn with_oracle(mut self, oracle: Box<dyn DistanceOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replace the clock, e.g. to start at a given time of day
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a participant into both stores; returns its initial availability
    pub fn spawn(&mut self, participant: Participant) -> Result<bool> {
        let object = WorldObject {
            id: participant.id,
            category: participant.category(),
            placement: participant.placement,
        };
        let scope = ConditionScope {
            flags: &self.flags,
            clock: &self.clock,
        };
        let available = self.registry.register(participant, &scope)?;
        self.objects.add(object);
        Ok(available)
    }

    /// Remove a participant from simulation
    ///
    /// A travelling squad's action is dropped with it and never reaches its
    /// arrival hooks. Squads heading to a despawned target notice on their
    /// next tick.
    pub fn despawn(&mut self, id: ParticipantId) -> Result<Participant> {
        let participant = self
            .registry
            .unregister(id)
            .ok_or(DirectorError::ParticipantNotFound(id))?;
        self.objects.remove(id);

        match &participant.body {
            Body::Squad(squad) => {
                if let Some(hub) = squad.stationed_at {
                    if let Some(hub_body) = self.registry.get_mut(hub).and_then(|p| p.as_hub_mut()) {
                        hub_body.occupants.retain(|s| *s != id);
                    }
                }
            }
            Body::Hub(hub) => {
                for squad in &hub.occupants {
                    if let Some(body) = self.registry.get_mut(*squad).and_then(|p| p.as_squad_mut()) {
                        body.stationed_at = None;
                    }
                }
            }
            Body::Player(_) => {}
        }

        tracing::debug!("Despawned {}", id);
        Ok(participant)
    }

    /// Position update from the movement layer
    pub fn move_participant(&mut self, id: ParticipantId, position: Vec2, region: RegionId) -> Result<()> {
        let placement = Placement::new(position, region);
        let participant = self
            .registry
            .get_mut(id)
            .ok_or(DirectorError::ParticipantNotFound(id))?;
        participant.placement = placement;
        self.objects.relocate(id, placement);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Engine-side state changes
    //
    // Availability is recomputed at the start of the next resolver pass,
    // which reports any flips as events.
    // ------------------------------------------------------------------

    /// Mark one squad member as abstracted (offline) or fully simulated
    pub fn set_member_offline(&mut self, squad: ParticipantId, member: u32, offline: bool) -> Result<()> {
        let body = self.squad_mut(squad)?;
        if let Some(m) = body.members.iter_mut().find(|m| m.id == member) {
            m.offline = offline;
        }
        Ok(())
    }

    /// Mark every member of a squad at once
    pub fn set_squad_offline(&mut self, squad: ParticipantId, offline: bool) -> Result<()> {
        let body = self.squad_mut(squad)?;
        for m in &mut body.members {
            m.offline = offline;
        }
        Ok(())
    }

    /// A member died; a squad with no members left stops being a target
    pub fn remove_member(&mut self, squad: ParticipantId, member: u32) -> Result<()> {
        let body = self.squad_mut(squad)?;
        body.members.retain(|m| m.id != member);
        Ok(())
    }

    pub fn set_player_safe_zone(&mut self, in_safe_zone: bool) {
        let players: Vec<ParticipantId> = self
            .registry
            .iter()
            .filter(|p| matches!(p.body, Body::Player(_)))
            .map(|p| p.id)
            .collect();
        for id in players {
            if let Some(player) = self.registry.get_mut(id).and_then(|p| p.as_player_mut()) {
                player.in_safe_zone = in_safe_zone;
            }
        }
    }

    pub fn set_hub_siege(&mut self, hub: ParticipantId, under_siege: bool) -> Result<()> {
        let body = self
            .registry
            .get_mut(hub)
            .and_then(|p| p.as_hub_mut())
            .ok_or(DirectorError::ParticipantNotFound(hub))?;
        body.under_siege = under_siege;
        Ok(())
    }

    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.set(name, value);
    }

    pub fn set_surge(&mut self, active: bool) {
        self.clock.set_surge(active);
    }

    pub fn override_weight(&mut self, id: ParticipantId, name: impl Into<String>, value: f32) -> Result<()> {
        self.registry.override_weight(id, name, value)
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance one simulation step, resolving on every `resolve_interval`th tick
    pub fn tick(&mut self) -> Vec<DirectorEvent> {
        let events = if self.clock.current_tick() % self.config.resolve_interval == 0 {
            self.resolve_now()
        } else {
            Vec::new()
        };
        self.clock.advance();
        events
    }

    /// Run one resolver pass immediately
    pub fn resolve_now(&mut self) -> Vec<DirectorEvent> {
        let resolver = AssignmentResolver::new(&self.rules, &self.config);
        let mut world = ResolverWorld {
            registry: &mut self.registry,
            objects: &self.objects,
            flags: &mut self.flags,
            clock: &self.clock,
            oracle: self.oracle.as_ref(),
        };
        let events = resolver.resolve_all(&mut world);
        if !events.is_empty() {
            tracing::trace!("Tick {}: {} director events", self.clock.current_tick(), events.len());
        }
        events
    }

    /// Score one pairing against the current world state
    pub fn score(&self, squad: ParticipantId, target: ParticipantId) -> Result<f32> {
        let subject = self.participant(squad)?;
        let candidate = self.participant(target)?;
        let evaluator = PriorityEvaluator::new(&self.rules, &self.config);
        Ok(evaluator.score(subject, candidate, &self.scoring_context()))
    }

    /// Eligible targets for a squad, best first
    pub fn rank_candidates(&self, squad: ParticipantId) -> Result<Vec<(ParticipantId, f32)>> {
        self.squad(squad)?;
        let resolver = AssignmentResolver::new(&self.rules, &self.config);
        Ok(resolver.rank_candidates(&self.registry, squad, &self.scoring_context()))
    }

    pub fn assigned_target(&self, squad: ParticipantId) -> Result<Option<ParticipantId>> {
        Ok(self.squad(squad)?.assigned_target())
    }

    pub fn action_state(&self, squad: ParticipantId) -> Result<Option<ActionState>> {
        Ok(self.squad(squad)?.current_action().map(|a| a.state()))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn save_assignments(&self) -> SavedAssignments {
        let squads = self
            .registry
            .iter()
            .filter_map(|p| {
                p.as_squad().map(|body| SquadRecord {
                    squad: p.id,
                    state: SquadSaveState::capture(body),
                })
            })
            .collect();
        SavedAssignments::new(self.clock.current_tick(), self.flags.clone(), squads)
    }

    /// Restore a save; nothing is applied if any record is inconsistent
    pub fn restore_assignments(&mut self, saved: &SavedAssignments) -> Result<()> {
        let mut actions = Vec::with_capacity(saved.squads.len());
        for record in &saved.squads {
            if !self.registry.contains(record.squad) {
                tracing::warn!("Saved squad {} is not spawned, skipping", record.squad);
                continue;
            }
            self.squad(record.squad)?;
            actions.push((record.squad, record.state.into_action(record.squad)?));
        }

        for (squad, action) in actions {
            self.squad_mut(squad)?.action = action;
        }
        self.flags = saved.flags.clone();
        self.clock.set_tick(saved.tick);
        tracing::info!("Restored {} squad assignments at tick {}", saved.squads.len(), saved.tick);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn objects(&self) -> &WorldObjects {
        &self.objects
    }

    pub fn flags(&self) -> &WorldFlags {
        &self.flags
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn participant(&self, id: ParticipantId) -> Result<&Participant> {
        self.registry
            .get(id)
            .ok_or(DirectorError::ParticipantNotFound(id))
    }

    fn squad(&self, id: ParticipantId) -> Result<&SquadBody> {
        self.participant(id)?
            .as_squad()
            .ok_or(DirectorError::NotASquad(id))
    }

    fn squad_mut(&mut self, id: ParticipantId) -> Result<&mut SquadBody> {
        self.registry
            .get_mut(id)
            .ok_or(DirectorError::ParticipantNotFound(id))?
            .as_squad_mut()
            .ok_or(DirectorError::NotASquad(id))
    }

    fn scoring_context(&self) -> ScoringContext<'_> {
        ScoringContext {
            clock: &self.clock,
            flags: &self.flags,
            oracle: self.oracle.as_ref(),
        }
    }
}
