//! Priority scoring for (squad, target) pairs
//!
//! `score = (base + behaviour . weights) * (1 + 1 / max(distance, min_distance))`
//! after the faction rule gate and the same-region check. A score of 0
//! means the pairing is ineligible.

use crate::core::config::DirectorConfig;
use crate::registry::participant::Participant;
use crate::registry::weights::sparse_dot;
use crate::rules::faction_rules::FactionRuleTable;
use crate::rules::predicate::RuleInput;
use crate::world::flags::FlagQuery;
use crate::world::oracle::{DistanceOracle, WorldClock};

/// Read-only world state consulted while scoring
#[derive(Clone, Copy)]
pub struct ScoringContext<'a> {
    pub clock: &'a dyn WorldClock,
    pub flags: &'a dyn FlagQuery,
    pub oracle: &'a dyn DistanceOracle,
}

pub struct PriorityEvaluator<'a> {
    rules: &'a FactionRuleTable,
    config: &'a DirectorConfig,
}

impl<'a> PriorityEvaluator<'a> {
    pub fn new(rules: &'a FactionRuleTable, config: &'a DirectorConfig) -> Self {
        Self { rules, config }
    }

    /// Distance multiplier, 2.0 at or below `min_distance` (default 1)
    pub fn falloff(&self, distance: f32) -> f32 {
        1.0 + 1.0 / distance.max(self.config.min_distance)
    }

    /// Score a target for a squad; pure for fixed inputs
    pub fn score(&self, squad: &Participant, target: &Participant, ctx: &ScoringContext<'_>) -> f32 {
        let Some(body) = squad.as_squad() else {
            return 0.0;
        };
        if squad.id == target.id {
            return 0.0;
        }

        let distance = ctx.oracle.distance(&squad.placement, &target.placement);
        let input = RuleInput {
            squad,
            target,
            distance,
            clock: ctx.clock,
            flags: ctx.flags,
        };
        if !self.rules.gate(&input) {
            return 0.0;
        }

        // squads do not path across levels
        if !squad.placement.same_region(&target.placement) {
            return 0.0;
        }

        let weighted = self.config.base_score + sparse_dot(&body.behaviour, &target.weights);
        // 0 is the ineligible floor
        (weighted * self.falloff(distance)).max(0.0)
    }
}
