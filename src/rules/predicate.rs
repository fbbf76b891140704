//! Declarative precondition predicates for faction rules
//!
//! Predicates read only: the hour-of-day window, the surge flag, the linear
//! distance between squad and target, and named world-state flags.

use std::fmt;

use crate::core::clock::TimeOfDay;
use crate::registry::participant::Participant;
use crate::world::flags::FlagQuery;
use crate::world::oracle::WorldClock;

/// Everything a rule predicate may look at
pub struct RuleInput<'a> {
    pub squad: &'a Participant,
    pub target: &'a Participant,
    /// Linear distance between squad and target
    pub distance: f32,
    pub clock: &'a dyn WorldClock,
    pub flags: &'a dyn FlagQuery,
}

/// Half-open time window `[start, end)`; wraps past midnight when `end < start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl HourWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Parse `"21:00-08:00"`
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('-')?;
        Some(Self {
            start: TimeOfDay::parse(start)?,
            end: TimeOfDay::parse(end)?,
        })
    }

    /// An equal start and end is an empty window
    pub fn contains(&self, time: TimeOfDay) -> bool {
        let start = self.start.minutes();
        let end = self.end.minutes();
        let t = time.minutes();
        if start <= end {
            t >= start && t < end
        } else {
            t >= start || t < end
        }
    }
}

/// Engine-provided predicate; a plain function pointer so it cannot capture state
#[derive(Clone, Copy)]
pub struct CustomPredicate {
    pub name: &'static str,
    pub check: fn(&RuleInput<'_>) -> bool,
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomPredicate({})", self.name)
    }
}

/// Precondition over `(squad, target, world clock)`
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Current time of day falls inside the window
    Hours(HourWindow),
    /// Surge active flag equals the value
    Surge(bool),
    /// Target is at most this far away
    MaxDistance(f32),
    /// Target is at least this far away
    MinDistance(f32),
    /// World-state flag equals the expected value
    Flag { name: String, expected: bool },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Custom(CustomPredicate),
}

impl Predicate {
    pub fn flag(name: impl Into<String>) -> Self {
        Predicate::Flag {
            name: name.into(),
            expected: true,
        }
    }

    pub fn eval(&self, input: &RuleInput<'_>) -> bool {
        match self {
            Predicate::Hours(window) => window.contains(input.clock.time_of_day()),
            Predicate::Surge(expected) => input.clock.surge_active() == *expected,
            Predicate::MaxDistance(max) => input.distance <= *max,
            Predicate::MinDistance(min) => input.distance >= *min,
            Predicate::Flag { name, expected } => input.flags.flag(name) == *expected,
            Predicate::All(preds) => preds.iter().all(|p| p.eval(input)),
            Predicate::Any(preds) => preds.iter().any(|p| p.eval(input)),
            Predicate::Not(inner) => !inner.eval(input),
            Predicate::Custom(custom) => (custom.check)(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, ParticipantId, Placement, RegionId, Vec2};
    use crate::registry::participant::{HubKind, Participant};
    use crate::world::flags::WorldFlags;
    use crate::world::oracle::ClockSnapshot;

    fn at(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute)
    }

    fn fixtures() -> (Participant, Participant) {
        let place = Placement::new(Vec2::ZERO, RegionId(1));
        let squad = Participant::squad(ParticipantId(1), "squad", FactionId::new("stalker"), place, 4);
        let hub = Participant::hub(ParticipantId(2), "hub", HubKind::Resource, place, 2);
        (squad, hub)
    }

    #[test]
    fn test_plain_window() {
        let window = HourWindow::parse("08:00-21:00").unwrap();
        assert!(window.contains(at(8, 0)));
        assert!(window.contains(at(20, 59)));
        assert!(!window.contains(at(21, 0)));
        assert!(!window.contains(at(3, 0)));
    }

    #[test]
    fn test_wrap_around_window() {
        let window = HourWindow::parse("21:00-08:00").unwrap();
        assert!(window.contains(at(21, 0)));
        assert!(window.contains(at(23, 59)));
        assert!(window.contains(at(0, 0)));
        assert!(window.contains(at(7, 59)));
        assert!(!window.contains(at(8, 0)));
        assert!(!window.contains(at(12, 0)));
    }

    #[test]
    fn test_equal_bounds_is_empty() {
        let window = HourWindow::new(at(6, 0), at(6, 0));
        assert!(!window.contains(at(6, 0)));
        assert!(!window.contains(at(18, 0)));
    }

    #[test]
    fn test_malformed_window() {
        assert!(HourWindow::parse("21:00").is_none());
        assert!(HourWindow::parse("dusk-dawn").is_none());
    }

    #[test]
    fn test_predicate_eval() {
        let (squad, hub) = fixtures();
        let mut flags = WorldFlags::new();
        flags.set("bandits_attack_harder", true);
        let clock = ClockSnapshot::new(at(22, 0), false);
        let input = RuleInput {
            squad: &squad,
            target: &hub,
            distance: 50.0,
            clock: &clock,
            flags: &flags,
        };

        assert!(Predicate::Hours(HourWindow::parse("21:00-08:00").unwrap()).eval(&input));
        assert!(Predicate::Surge(false).eval(&input));
        assert!(!Predicate::Surge(true).eval(&input));
        assert!(Predicate::MaxDistance(50.0).eval(&input));
        assert!(!Predicate::MaxDistance(49.0).eval(&input));
        assert!(Predicate::MinDistance(10.0).eval(&input));
        assert!(Predicate::flag("bandits_attack_harder").eval(&input));
        assert!(Predicate::Not(Box::new(Predicate::flag("missing"))).eval(&input));

        let combined = Predicate::All(vec![Predicate::Surge(false), Predicate::MaxDistance(10.0)]);
        assert!(!combined.eval(&input));
        let either = Predicate::Any(vec![Predicate::Surge(true), Predicate::MaxDistance(100.0)]);
        assert!(either.eval(&input));
    }

    #[test]
    fn test_custom_predicate() {
        fn same_region(input: &RuleInput<'_>) -> bool {
            input.squad.placement.same_region(&input.target.placement)
        }

        let (squad, hub) = fixtures();
        let flags = WorldFlags::new();
        let clock = ClockSnapshot::new(at(12, 0), false);
        let input = RuleInput {
            squad: &squad,
            target: &hub,
            distance: 0.0,
            clock: &clock,
            flags: &flags,
        };

        let pred = Predicate::Custom(CustomPredicate {
            name: "same_region",
            check: same_region,
        });
        assert!(pred.eval(&input));
        assert_eq!(format!("{:?}", pred), "Custom(CustomPredicate(same_region))");
    }
}
