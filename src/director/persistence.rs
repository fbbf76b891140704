//! Save-game state for squad assignments
//!
//! Only the scalar pair (target id, action state) is persisted per squad,
//! together with the world flags and the tick it was taken at. A squad
//! restored mid-travel resumes its action on the next resolver pass.

use serde::{Deserialize, Serialize};

use crate::core::error::{DirectorError, Result};
use crate::core::types::{ParticipantId, Tick};
use crate::director::reach_target::{ActionState, ReachTargetAction};
use crate::registry::participant::SquadBody;
use crate::world::flags::WorldFlags;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Per-squad persisted fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadSaveState {
    #[serde(default)]
    pub assigned_target: Option<ParticipantId>,
    #[serde(default)]
    pub action_state: Option<ActionState>,
}

impl SquadSaveState {
    pub fn capture(squad: &SquadBody) -> Self {
        let action = squad.current_action();
        Self {
            assigned_target: action.map(|a| a.target()),
            action_state: action.map(|a| a.state()),
        }
    }

    /// Rebuild the in-memory action, rejecting a half-set pair
    pub fn into_action(self, squad: ParticipantId) -> Result<Option<ReachTargetAction>> {
        match (self.assigned_target, self.action_state) {
            (Some(target), Some(state)) => Ok(Some(ReachTargetAction::resume(target, state))),
            (None, None) => Ok(None),
            (Some(target), None) => Err(DirectorError::LifecycleViolation {
                squad,
                detail: format!("target {} saved without an action", target),
            }),
            (None, Some(state)) => Err(DirectorError::LifecycleViolation {
                squad,
                detail: format!("action in state {:?} saved without a target", state),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadRecord {
    pub squad: ParticipantId,
    #[serde(flatten)]
    pub state: SquadSaveState,
}

/// Root structure of a saved director state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAssignments {
    /// Schema version (currently 1)
    pub version: u32,
    pub tick: Tick,
    #[serde(default)]
    pub flags: WorldFlags,
    pub squads: Vec<SquadRecord>,
}

impl SavedAssignments {
    pub fn new(tick: Tick, flags: WorldFlags, squads: Vec<SquadRecord>) -> Self {
        Self {
            version: SAVE_VERSION,
            tick,
            flags,
            squads,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let saved: Self = serde_json::from_str(json)?;
        if saved.version != SAVE_VERSION {
            return Err(DirectorError::Config(format!(
                "unsupported save version {} (expected {})",
                saved.version, SAVE_VERSION
            )));
        }
        Ok(saved)
    }
}
