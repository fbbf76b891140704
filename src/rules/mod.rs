//! Faction rule tables, predicates and availability conditions loaded from TOML

pub mod condition;
pub mod faction_rules;
pub mod loader;
pub mod predicate;

pub use condition::{AvailabilityConditions, Condition, ConditionScope};
pub use faction_rules::{FactionRow, FactionRuleTable, RuleEntry, TargetKey};
pub use loader::{load_director_dir, parse_factions_toml, parse_weights_toml, DirectorRules};
pub use predicate::{CustomPredicate, HourWindow, Predicate, RuleInput};
