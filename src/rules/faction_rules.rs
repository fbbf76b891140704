//! Per-faction precondition tables
//!
//! The only faction-specific logic in the director. A row is keyed by the
//! squad's faction; inside the row, entries are keyed by the target's hub
//! kind, the rival squad's faction, or the player. A missing entry rejects
//! the pairing: there is no implicit default.

use ahash::AHashMap;

use crate::core::types::FactionId;
use crate::registry::participant::{Category, HubKind, Participant};
use crate::rules::predicate::{Predicate, RuleInput};

/// What a rule entry is keyed on, derived from the target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Hub(HubKind),
    /// A squad of the given faction
    Squad(FactionId),
    Player,
}

impl TargetKey {
    /// Key for a target; a squad without a faction has no key
    pub fn of(target: &Participant) -> Option<TargetKey> {
        match target.category() {
            Category::LocationHub(kind) => Some(TargetKey::Hub(kind)),
            Category::Squad => target.faction().cloned().map(TargetKey::Squad),
            Category::Player => Some(TargetKey::Player),
        }
    }
}

/// A single table cell
#[derive(Debug, Clone)]
pub enum RuleEntry {
    Never,
    Always,
    Predicate(Predicate),
}

impl RuleEntry {
    pub fn allows(&self, input: &RuleInput<'_>) -> bool {
        match self {
            RuleEntry::Never => false,
            RuleEntry::Always => true,
            RuleEntry::Predicate(pred) => pred.eval(input),
        }
    }
}

/// All rules for a single faction
#[derive(Debug, Clone, Default)]
pub struct FactionRow {
    entries: AHashMap<TargetKey, RuleEntry>,
}

impl FactionRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: TargetKey, entry: RuleEntry) -> Self {
        self.entries.insert(key, entry);
        self
    }

    pub fn insert(&mut self, key: TargetKey, entry: RuleEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &TargetKey) -> Option<&RuleEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Central storage for all faction rows
#[derive(Debug, Clone, Default)]
pub struct FactionRuleTable {
    rows: AHashMap<FactionId, FactionRow>,
}

impl FactionRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the row for a faction
    pub fn insert(&mut self, faction: FactionId, row: FactionRow) {
        self.rows.insert(faction, row);
    }

    /// Set a single cell, creating the row if needed
    pub fn set(&mut self, faction: FactionId, key: TargetKey, entry: RuleEntry) {
        self.rows.entry(faction).or_default().insert(key, entry);
    }

    pub fn row(&self, faction: &FactionId) -> Option<&FactionRow> {
        self.rows.get(faction)
    }

    pub fn entry(&self, faction: &FactionId, key: &TargetKey) -> Option<&RuleEntry> {
        self.rows.get(faction).and_then(|row| row.get(key))
    }

    pub fn factions(&self) -> impl Iterator<Item = &FactionId> {
        self.rows.keys()
    }

    /// Is this squad allowed to consider this target at all?
    ///
    /// Deterministic for fixed inputs. Non-squad subjects are always rejected.
    pub fn gate(&self, input: &RuleInput<'_>) -> bool {
        let Some(faction) = input.squad.faction() else {
            return false;
        };
        let Some(key) = TargetKey::of(input.target) else {
            return false;
        };
        self.entry(faction, &key)
            .map(|entry| entry.allows(input))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::TimeOfDay;
    use crate::core::types::{ParticipantId, Placement, RegionId, Vec2};
    use crate::world::flags::WorldFlags;
    use crate::world::oracle::ClockSnapshot;

    fn place() -> Placement {
        Placement::new(Vec2::ZERO, RegionId(1))
    }

    fn squad(id: u32, faction: &str) -> Participant {
        Participant::squad(ParticipantId(id), "squad", FactionId::new(faction), place(), 3)
    }

    fn check(table: &FactionRuleTable, squad: &Participant, target: &Participant, flags: &WorldFlags) -> bool {
        let clock = ClockSnapshot::new(TimeOfDay::new(12, 0), false);
        table.gate(&RuleInput {
            squad,
            target,
            distance: 30.0,
            clock: &clock,
            flags,
        })
    }

    #[test]
    fn test_missing_row_rejects() {
        let table = FactionRuleTable::new();
        let hub = Participant::hub(ParticipantId(2), "hub", HubKind::Base, place(), 4);
        assert!(!check(&table, &squad(1, "stalker"), &hub, &WorldFlags::new()));
    }

    #[test]
    fn test_missing_entry_rejects() {
        let mut table = FactionRuleTable::new();
        table.set(FactionId::new("stalker"), TargetKey::Hub(HubKind::Base), RuleEntry::Always);

        let lair = Participant::hub(ParticipantId(2), "lair", HubKind::Lair, place(), 4);
        assert!(!check(&table, &squad(1, "stalker"), &lair, &WorldFlags::new()));
    }

    #[test]
    fn test_always_and_never() {
        let mut table = FactionRuleTable::new();
        let row = FactionRow::new()
            .with(TargetKey::Hub(HubKind::Base), RuleEntry::Always)
            .with(TargetKey::Hub(HubKind::Lair), RuleEntry::Never);
        table.insert(FactionId::new("stalker"), row);

        let base = Participant::hub(ParticipantId(2), "base", HubKind::Base, place(), 4);
        let lair = Participant::hub(ParticipantId(3), "lair", HubKind::Lair, place(), 4);
        let flags = WorldFlags::new();
        assert!(check(&table, &squad(1, "stalker"), &base, &flags));
        assert!(!check(&table, &squad(1, "stalker"), &lair, &flags));
    }

    #[test]
    fn test_rival_squad_keyed_by_target_faction() {
        let mut table = FactionRuleTable::new();
        table.set(
            FactionId::new("stalker"),
            TargetKey::Squad(FactionId::new("bandit")),
            RuleEntry::Predicate(Predicate::MaxDistance(50.0)),
        );

        let flags = WorldFlags::new();
        assert!(check(&table, &squad(1, "stalker"), &squad(2, "bandit"), &flags));
        assert!(!check(&table, &squad(1, "stalker"), &squad(3, "monolith"), &flags));
        // rows are directional
        assert!(!check(&table, &squad(2, "bandit"), &squad(1, "stalker"), &flags));
    }

    #[test]
    fn test_player_rule_reads_flags() {
        let mut table = FactionRuleTable::new();
        table.set(
            FactionId::new("bandit"),
            TargetKey::Player,
            RuleEntry::Predicate(Predicate::flag("bandits_hunt_player")),
        );

        let player = Participant::player(ParticipantId(0), place());
        let mut flags = WorldFlags::new();
        assert!(!check(&table, &squad(1, "bandit"), &player, &flags));

        flags.set("bandits_hunt_player", true);
        assert!(check(&table, &squad(1, "bandit"), &player, &flags));
    }

    #[test]
    fn test_hub_as_subject_rejected() {
        let mut table = FactionRuleTable::new();
        table.set(FactionId::new("stalker"), TargetKey::Player, RuleEntry::Always);

        let hub = Participant::hub(ParticipantId(2), "hub", HubKind::Base, place(), 4);
        let player = Participant::player(ParticipantId(0), place());
        assert!(!check(&table, &hub, &player, &WorldFlags::new()));
    }
}
