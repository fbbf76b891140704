//! Narrow interfaces to the world/engine layer
//!
//! The director never owns time or geometry. It asks a [`WorldClock`] for the
//! time of day and the surge flag, and a [`DistanceOracle`] for distances.

use crate::core::clock::TimeOfDay;
use crate::core::types::Placement;

/// Simulated time of day plus the global hazard ("surge") flag
pub trait WorldClock {
    fn time_of_day(&self) -> TimeOfDay;
    fn surge_active(&self) -> bool;
}

/// Distance between two positioned entities
pub trait DistanceOracle {
    fn distance_squared(&self, a: &Placement, b: &Placement) -> f32;

    fn distance(&self, a: &Placement, b: &Placement) -> f32 {
        self.distance_squared(a, b).sqrt()
    }
}

/// Straight-line distance on the region plane
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceOracle for EuclideanDistance {
    fn distance_squared(&self, a: &Placement, b: &Placement) -> f32 {
        a.position.distance_squared(b.position)
    }
}

/// A fixed clock reading, handy for scoring snapshots and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSnapshot {
    pub time: TimeOfDay,
    pub surge: bool,
}

impl ClockSnapshot {
    pub fn new(time: TimeOfDay, surge: bool) -> Self {
        Self { time, surge }
    }

    pub fn capture(clock: &dyn WorldClock) -> Self {
        Self {
            time: clock.time_of_day(),
            surge: clock.surge_active(),
        }
    }
}

impl WorldClock for ClockSnapshot {
    fn time_of_day(&self) -> TimeOfDay {
        self.time
    }

    fn surge_active(&self) -> bool {
        self.surge
    }
}
