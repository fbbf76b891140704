//! Travel-and-arrival state machine
//!
//! `Traveling -> Reached`. The action only observes: it resolves the target,
//! checks arrival and reports. Arrival bookkeeping (target notification,
//! member markers, relocation) is done by the resolver driving the tick.
//! There is no travel timeout; only a vanished target ends travel early.

use serde::{Deserialize, Serialize};

use crate::core::config::DirectorConfig;
use crate::core::types::{ParticipantId, Placement};
use crate::director::lookup::{TargetLookup, TargetView};
use crate::registry::participant::Category;
use crate::world::oracle::DistanceOracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionState {
    Traveling,
    Reached,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not there yet
    Traveling,
    /// Arrived on this tick
    Arrived,
    /// Target is gone; the squad needs reassignment
    TargetLost,
    /// Already reached on an earlier tick; nothing happened
    AlreadyReached,
}

impl TickOutcome {
    pub fn is_done(&self) -> bool {
        !matches!(self, TickOutcome::Traveling)
    }
}

/// Has a squad at `squad` arrived at `target`?
///
/// Hubs use a squared-distance threshold, rival squads the engage radius,
/// the player the contact radius. Every category requires the same region.
pub fn has_arrived(
    squad: &Placement,
    target: &TargetView,
    config: &DirectorConfig,
    oracle: &dyn DistanceOracle,
) -> bool {
    if !squad.same_region(&target.placement) {
        return false;
    }
    let distance_sq = oracle.distance_squared(squad, &target.placement);
    match target.category {
        Category::LocationHub(_) => distance_sq <= config.hub_arrival_distance_sq,
        Category::Squad => distance_sq <= config.engage_distance * config.engage_distance,
        Category::Player => {
            distance_sq <= config.player_contact_distance * config.player_contact_distance
        }
    }
}

/// Per-squad travel action, owned by its squad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachTargetAction {
    target: ParticipantId,
    state: ActionState,
}

impl ReachTargetAction {
    pub fn new(target: ParticipantId) -> Self {
        Self {
            target,
            state: ActionState::Traveling,
        }
    }

    /// Rebuild an action from saved state
    pub fn resume(target: ParticipantId, state: ActionState) -> Self {
        Self { target, state }
    }

    pub fn target(&self) -> ParticipantId {
        self.target
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn tick(
        &mut self,
        squad: &Placement,
        lookup: &dyn TargetLookup,
        config: &DirectorConfig,
        oracle: &dyn DistanceOracle,
    ) -> TickOutcome {
        if self.state == ActionState::Reached {
            return TickOutcome::AlreadyReached;
        }

        let Some(target) = lookup.resolve(self.target) else {
            return TickOutcome::TargetLost;
        };

        if has_arrived(squad, &target, config, oracle) {
            self.state = ActionState::Reached;
            TickOutcome::Arrived
        } else {
            TickOutcome::Traveling
        }
    }
}
