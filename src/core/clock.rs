//! Simulated clock for time-of-day tracking
//!
//! Rule predicates gate on hour-of-day windows, so the clock exposes the
//! current time as minutes since midnight alongside the global surge flag.

use serde::{Deserialize, Serialize};

use crate::world::oracle::WorldClock;

/// A wall-clock time inside a simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u32 = 24 * 60;

    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        let minutes = minutes % Self::MINUTES_PER_DAY;
        Self {
            hour: minutes / 60,
            minute: minutes % 60,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Parse `"HH:MM"` (or a bare `"HH"`)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (h, m) = match s.split_once(':') {
            Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
            None => (s.parse::<u32>().ok()?, 0),
        };
        // 24:00 is accepted as the end of day
        if h > 24 || m > 59 || (h == 24 && m != 0) {
            return None;
        }
        Some(Self { hour: h, minute: m })
    }
}

/// Clock tracks simulation time with minute granularity plus the surge flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    tick: u64,
    ticks_per_day: u64,
    /// Offset into the day at tick 0, in minutes
    start_minutes: u32,
    surge_active: bool,
}

impl SimClock {
    pub fn new(ticks_per_day: u64) -> Self {
        Self {
            tick: 0,
            ticks_per_day: ticks_per_day.max(1),
            start_minutes: 0,
            surge_active: false,
        }
    }

    /// Start the clock at a given time of day
    pub fn starting_at(mut self, time: TimeOfDay) -> Self {
        self.start_minutes = time.minutes() % TimeOfDay::MINUTES_PER_DAY;
        self
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn current_day(&self) -> u64 {
        self.elapsed_minutes() / TimeOfDay::MINUTES_PER_DAY as u64
    }

    pub fn set_surge(&mut self, active: bool) {
        self.surge_active = active;
    }

    /// Restore the tick counter from a save
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    fn elapsed_minutes(&self) -> u64 {
        let tick_minutes = (self.tick * TimeOfDay::MINUTES_PER_DAY as u64) / self.ticks_per_day;
        self.start_minutes as u64 + tick_minutes
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1440)
    }
}

impl WorldClock for SimClock {
    fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_minutes((self.elapsed_minutes() % TimeOfDay::MINUTES_PER_DAY as u64) as u32)
    }

    fn surge_active(&self) -> bool {
        self.surge_active
    }
}
