//! Participants, their static weights, and the candidate pool

pub mod participant;
pub mod pool;
pub mod weights;

pub use participant::{Body, Category, HubBody, HubKind, Member, Participant, PlayerBody, SquadBody};
pub use pool::ParticipantRegistry;
pub use weights::{WeightTables, Weights};
