//! Simulation participants: squads, location hubs and the player
//!
//! Every participant can be scored as a target. Squads are also scoring
//! subjects and carry their current assignment.

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, ParticipantId, Placement};
use crate::director::reach_target::ReachTargetAction;
use crate::registry::weights::Weights;
use crate::rules::condition::Condition;

/// Purpose of a location hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HubKind {
    Base,
    Resource,
    Territory,
    Shelter,
    Lair,
}

impl HubKind {
    pub const ALL: [HubKind; 5] = [
        HubKind::Base,
        HubKind::Resource,
        HubKind::Territory,
        HubKind::Shelter,
        HubKind::Lair,
    ];

    /// Key used in rule files
    pub fn key(&self) -> &'static str {
        match self {
            HubKind::Base => "base",
            HubKind::Resource => "resource",
            HubKind::Territory => "territory",
            HubKind::Shelter => "shelter",
            HubKind::Lair => "lair",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        HubKind::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Participant category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Squad,
    LocationHub(HubKind),
    Player,
}

/// A squad member as far as the director cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    /// Abstracted ("offline") simulation marker
    pub offline: bool,
}

#[derive(Debug, Clone)]
pub struct SquadBody {
    pub faction: FactionId,
    /// Subject-side coefficients for the scoring dot product
    pub behaviour: Weights,
    pub members: Vec<Member>,
    /// Hub the squad is currently stationed at, if any
    pub stationed_at: Option<ParticipantId>,
    /// Current target and travel state; the target id lives inside the
    /// action so the two are always set and cleared together
    pub(crate) action: Option<ReachTargetAction>,
}

impl SquadBody {
    /// Under abstracted simulation when every member is offline
    pub fn under_simulation(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.offline)
    }

    pub fn current_action(&self) -> Option<&ReachTargetAction> {
        self.action.as_ref()
    }

    pub fn assigned_target(&self) -> Option<ParticipantId> {
        self.action.as_ref().map(|a| a.target())
    }

    pub fn is_assigned(&self) -> bool {
        self.action.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct HubBody {
    pub kind: HubKind,
    /// Maximum number of squads stationed at once
    pub capacity: u32,
    /// Stationed squads in arrival order
    pub occupants: Vec<ParticipantId>,
    pub under_siege: bool,
    /// World flags written when a squad arrives
    pub arrival_flags: Vec<(String, bool)>,
}

impl HubBody {
    pub fn is_full(&self) -> bool {
        self.occupants.len() as u32 >= self.capacity
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerBody {
    /// Standing in a no-combat zone
    pub in_safe_zone: bool,
}

#[derive(Debug, Clone)]
pub enum Body {
    Squad(SquadBody),
    Hub(HubBody),
    Player(PlayerBody),
}

/// Any entity that can be a scoring target or subject
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    /// Configuration row name used for weights and availability
    pub profile: String,
    pub placement: Placement,
    /// Target-side coefficients, filled in at registration
    pub weights: Weights,
    /// Availability expression, read at registration
    pub condition: Option<Condition>,
    pub body: Body,
}

/// Profile name of the player
pub const ACTOR_PROFILE: &str = "actor";

impl Participant {
    pub fn squad(
        id: ParticipantId,
        profile: impl Into<String>,
        faction: FactionId,
        placement: Placement,
        member_count: u32,
    ) -> Self {
        let members = (0..member_count)
            .map(|i| Member { id: i, offline: false })
            .collect();
        Self::new(
            id,
            profile,
            placement,
            Body::Squad(SquadBody {
                faction,
                behaviour: Weights::default(),
                members,
                stationed_at: None,
                action: None,
            }),
        )
    }

    pub fn hub(
        id: ParticipantId,
        profile: impl Into<String>,
        kind: HubKind,
        placement: Placement,
        capacity: u32,
    ) -> Self {
        Self::new(
            id,
            profile,
            placement,
            Body::Hub(HubBody {
                kind,
                capacity,
                occupants: Vec::new(),
                under_siege: false,
                arrival_flags: Vec::new(),
            }),
        )
    }

    pub fn player(id: ParticipantId, placement: Placement) -> Self {
        Self::new(id, ACTOR_PROFILE, placement, Body::Player(PlayerBody::default()))
    }

    fn new(id: ParticipantId, profile: impl Into<String>, placement: Placement, body: Body) -> Self {
        Self {
            id,
            profile: profile.into(),
            placement,
            weights: Weights::default(),
            condition: None,
            body,
        }
    }

    /// Flag written to the world when a squad arrives (hubs only)
    pub fn with_arrival_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        if let Body::Hub(hub) = &mut self.body {
            hub.arrival_flags.push((name.into(), value));
        }
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn category(&self) -> Category {
        match &self.body {
            Body::Squad(_) => Category::Squad,
            Body::Hub(hub) => Category::LocationHub(hub.kind),
            Body::Player(_) => Category::Player,
        }
    }

    pub fn faction(&self) -> Option<&FactionId> {
        match &self.body {
            Body::Squad(squad) => Some(&squad.faction),
            _ => None,
        }
    }

    pub fn as_squad(&self) -> Option<&SquadBody> {
        match &self.body {
            Body::Squad(squad) => Some(squad),
            _ => None,
        }
    }

    pub fn as_squad_mut(&mut self) -> Option<&mut SquadBody> {
        match &mut self.body {
            Body::Squad(squad) => Some(squad),
            _ => None,
        }
    }

    pub fn as_hub(&self) -> Option<&HubBody> {
        match &self.body {
            Body::Hub(hub) => Some(hub),
            _ => None,
        }
    }

    pub fn as_hub_mut(&mut self) -> Option<&mut HubBody> {
        match &mut self.body {
            Body::Hub(hub) => Some(hub),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerBody> {
        match &mut self.body {
            Body::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Engine-level availability, checked on top of the profile condition
    ///
    /// Hubs must not be under siege or full, squads need living members,
    /// and the player must be outside a no-combat zone.
    pub fn engine_available(&self) -> bool {
        match &self.body {
            Body::Squad(squad) => !squad.members.is_empty(),
            Body::Hub(hub) => !hub.under_siege && !hub.is_full(),
            Body::Player(player) => !player.in_safe_zone,
        }
    }
}
