//! Outbound notifications produced by a resolver pass

use serde::Serialize;

use crate::core::types::ParticipantId;

/// Why a squad lost its assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearReason {
    /// Target despawned while the squad was travelling
    TargetLost,
    /// Target still exists but left the candidate pool or now scores 0
    TargetIneligible,
    /// A restored action was already in its terminal state
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirectorEvent {
    SquadAssigned {
        squad: ParticipantId,
        target: ParticipantId,
        score: f32,
    },
    AssignmentCleared {
        squad: ParticipantId,
        target: ParticipantId,
        reason: ClearReason,
    },
    /// Target has been notified of the arrival
    TargetReached {
        squad: ParticipantId,
        target: ParticipantId,
    },
    /// Offline markers cleared on arrival
    MembersOnline { squad: ParticipantId, count: usize },
    /// Squad is now stationed at a hub
    SquadRelocated {
        squad: ParticipantId,
        hub: ParticipantId,
    },
    /// Squad left the hub it was stationed at to travel
    SquadDeparted {
        squad: ParticipantId,
        hub: ParticipantId,
    },
    AvailabilityChanged {
        participant: ParticipantId,
        available: bool,
    },
}

impl DirectorEvent {
    /// The squad this event concerns, if any
    pub fn squad(&self) -> Option<ParticipantId> {
        match self {
            DirectorEvent::SquadAssigned { squad, .. }
            | DirectorEvent::AssignmentCleared { squad, .. }
            | DirectorEvent::TargetReached { squad, .. }
            | DirectorEvent::MembersOnline { squad, .. }
            | DirectorEvent::SquadRelocated { squad, .. }
            | DirectorEvent::SquadDeparted { squad, .. } => Some(*squad),
            DirectorEvent::AvailabilityChanged { .. } => None,
        }
    }
}
