pub mod flags;
pub mod objects;
pub mod oracle;

pub use flags::{FlagQuery, WorldFlags};
pub use objects::{WorldObject, WorldObjects};
pub use oracle::{ClockSnapshot, DistanceOracle, EuclideanDistance, WorldClock};
