//! Zone Director - target selection and travel for simulated squads

pub mod core;
pub mod director;
pub mod registry;
pub mod rules;
pub mod world;

pub use director::{Director, DirectorEvent};
