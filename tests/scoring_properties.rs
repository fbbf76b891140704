//! Property tests for scoring, assignment and lookup invariants

use proptest::prelude::*;

use zone_director::core::config::DirectorConfig;
use zone_director::core::types::{FactionId, ParticipantId, Placement, RegionId, Vec2};
use zone_director::director::{Director, DirectorEvent, Lookups, TargetLookup};
use zone_director::registry::participant::{HubKind, Participant};
use zone_director::rules::loader::{parse_factions_toml, parse_weights_toml, DirectorRules};

const FACTIONS: &str = r#"
    [factions.stalker]
    base = "always"
    resource = { max_distance = 60.0 }
    shelter = { flag = "storm" }

    [factions.stalker.squads]
    bandit = "always"

    [factions.bandit]
    resource = "always"
    territory = "always"

    [factions.bandit.squads]
    stalker = { min_distance = 5.0 }
"#;

const WEIGHTS: &str = r#"
    [target_weights.default]
    rest = 1.0

    [target_weights.squad]
    fight = 2.0

    [behaviour.stalker]
    rest = 2.0
    fight = 0.5

    [behaviour.bandit]
    fight = 1.5
"#;

fn director() -> Director {
    let (weights, availability) = parse_weights_toml(WEIGHTS).unwrap();
    let rules = DirectorRules {
        factions: parse_factions_toml(FACTIONS, &[]).unwrap(),
        weights,
        availability,
    };
    Director::new(DirectorConfig::default(), rules).unwrap()
}

#[derive(Debug, Clone)]
enum Spawn {
    Squad { faction: usize, x: f32, y: f32, region: u32, offline: bool },
    Hub { kind: usize, x: f32, y: f32, region: u32 },
}

fn spawn_strategy() -> impl Strategy<Value = Spawn> {
    prop_oneof![
        (0usize..2, 0.0f32..100.0, 0.0f32..100.0, 1u32..3, any::<bool>()).prop_map(
            |(faction, x, y, region, offline)| Spawn::Squad { faction, x, y, region, offline }
        ),
        (0usize..5, 0.0f32..100.0, 0.0f32..100.0, 1u32..3)
            .prop_map(|(kind, x, y, region)| Spawn::Hub { kind, x, y, region }),
    ]
}

fn populate(director: &mut Director, layout: &[Spawn]) {
    for (i, spawn) in layout.iter().enumerate() {
        let id = ParticipantId(i as u32 + 1);
        match spawn {
            Spawn::Squad { faction, x, y, region, offline } => {
                let faction = ["stalker", "bandit"][*faction];
                let placement = Placement::new(Vec2::new(*x, *y), RegionId(*region));
                director
                    .spawn(Participant::squad(id, faction, FactionId::new(faction), placement, 3))
                    .unwrap();
                director.set_squad_offline(id, *offline).unwrap();
            }
            Spawn::Hub { kind, x, y, region } => {
                let kind = HubKind::ALL[*kind];
                let placement = Placement::new(Vec2::new(*x, *y), RegionId(*region));
                director
                    .spawn(Participant::hub(id, kind.key(), kind, placement, 100))
                    .unwrap();
            }
        }
    }
}

/// Step assigned squads toward their targets like a movement layer would
fn step_squads(director: &mut Director, speed: f32) {
    let moves: Vec<_> = director
        .registry()
        .iter()
        .filter_map(|p| {
            let target = p.as_squad()?.assigned_target()?;
            let goal = director.registry().get(target)?.placement;
            let delta = goal.position - p.placement.position;
            let step = if delta.length() <= speed { delta } else { delta.normalize() * speed };
            Some((p.id, p.placement.position + step, p.placement.region))
        })
        .collect();
    for (id, position, region) in moves {
        director.move_participant(id, position, region).unwrap();
    }
}

fn squad_at(x: f32, region: u32) -> Participant {
    Participant::squad(
        ParticipantId(1),
        "stalker",
        FactionId::new("stalker"),
        Placement::new(Vec2::new(x, 0.0), RegionId(region)),
        2,
    )
}

proptest! {
    #[test]
    fn property_runs_are_deterministic(
        layout in prop::collection::vec(spawn_strategy(), 1..16),
        ticks in 1usize..40,
    ) {
        let mut a = director();
        let mut b = director();
        populate(&mut a, &layout);
        populate(&mut b, &layout);

        for _ in 0..ticks {
            let events_a = a.tick();
            let events_b = b.tick();
            prop_assert_eq!(events_a, events_b);
            step_squads(&mut a, 4.0);
            step_squads(&mut b, 4.0);
        }
    }

    #[test]
    fn property_unruled_target_scores_zero(x in -200.0f32..200.0, hx in -200.0f32..200.0) {
        // stalkers have no lair or territory rule
        let mut d = director();
        d.spawn(squad_at(x, 1)).unwrap();
        let lair = Placement::new(Vec2::new(hx, 0.0), RegionId(1));
        d.spawn(Participant::hub(ParticipantId(2), "lair", HubKind::Lair, lair, 4)).unwrap();
        d.spawn(Participant::hub(ParticipantId(3), "territory", HubKind::Territory, lair, 4)).unwrap();

        prop_assert_eq!(d.score(ParticipantId(1), ParticipantId(2)).unwrap(), 0.0);
        prop_assert_eq!(d.score(ParticipantId(1), ParticipantId(3)).unwrap(), 0.0);
        let none_assigned = d.tick().iter().all(|e| !matches!(e, DirectorEvent::SquadAssigned { .. }));
        prop_assert!(none_assigned);
    }

    #[test]
    fn property_other_region_scores_zero(x in -200.0f32..200.0, hx in -200.0f32..200.0, region in 2u32..10) {
        let mut d = director();
        d.spawn(squad_at(x, 1)).unwrap();
        let base = Placement::new(Vec2::new(hx, 0.0), RegionId(region));
        d.spawn(Participant::hub(ParticipantId(2), "base", HubKind::Base, base, 4)).unwrap();

        prop_assert_eq!(d.score(ParticipantId(1), ParticipantId(2)).unwrap(), 0.0);
    }

    #[test]
    fn property_closer_never_scores_lower(near in 0.0f32..500.0, extra in 0.0f32..500.0) {
        let mut d = director();
        d.spawn(squad_at(0.0, 1)).unwrap();
        let at = |x: f32| Placement::new(Vec2::new(x, 0.0), RegionId(1));
        d.spawn(Participant::hub(ParticipantId(2), "base", HubKind::Base, at(near), 4)).unwrap();
        d.spawn(Participant::hub(ParticipantId(3), "base", HubKind::Base, at(near + extra), 4)).unwrap();

        let close = d.score(ParticipantId(1), ParticipantId(2)).unwrap();
        let far = d.score(ParticipantId(1), ParticipantId(3)).unwrap();
        prop_assert!(close > 0.0);
        prop_assert!(close >= far, "close {} < far {}", close, far);
        prop_assert!(close.is_finite());
    }

    #[test]
    fn property_lookups_agree(layout in prop::collection::vec(spawn_strategy(), 1..16), moves in 0usize..10) {
        let mut d = director();
        populate(&mut d, &layout);
        for _ in 0..moves {
            d.tick();
            step_squads(&mut d, 7.0);
        }

        let lookups = Lookups::new(d.registry(), d.objects());
        for i in 0..layout.len() as u32 + 2 {
            let id = ParticipantId(i);
            prop_assert_eq!(lookups.fast.resolve(id), lookups.authoritative.resolve(id));
        }
    }

    #[test]
    fn property_target_and_action_stay_paired(
        layout in prop::collection::vec(spawn_strategy(), 1..16),
        despawns in prop::collection::vec(1u32..17, 0..4),
        ticks in 1usize..30,
    ) {
        let mut d = director();
        populate(&mut d, &layout);

        for tick in 0..ticks {
            d.tick();
            step_squads(&mut d, 5.0);
            if let Some(id) = despawns.get(tick) {
                d.despawn(ParticipantId(*id)).ok();
            }

            for p in d.registry().iter() {
                if let Some(squad) = p.as_squad() {
                    prop_assert_eq!(
                        squad.assigned_target().is_some(),
                        d.action_state(p.id).unwrap().is_some()
                    );
                }
            }
        }
    }

    #[test]
    fn property_unassigned_squads_have_no_candidate(
        layout in prop::collection::vec(spawn_strategy(), 1..16),
        ticks in 1usize..20,
    ) {
        let mut d = director();
        populate(&mut d, &layout);

        for _ in 0..ticks {
            let events = d.tick();
            let settled: Vec<ParticipantId> = events
                .iter()
                .filter_map(|e| match e {
                    DirectorEvent::TargetReached { squad, .. } => Some(*squad),
                    _ => None,
                })
                .collect();

            let squads: Vec<ParticipantId> = d
                .registry()
                .iter()
                .filter(|p| p.as_squad().is_some_and(|s| !s.is_assigned()))
                .map(|p| p.id)
                .filter(|id| !settled.contains(id))
                .collect();
            for squad in squads {
                let pool: Vec<ParticipantId> = d
                    .registry()
                    .candidates()
                    .map(|c| c.id)
                    .filter(|id| *id != squad)
                    .collect();
                for candidate in pool {
                    let score = d.score(squad, candidate).unwrap();
                    prop_assert!(
                        score <= 0.0,
                        "squad {} left unassigned with candidate {} scoring {}",
                        squad,
                        candidate,
                        score
                    );
                }
            }
            step_squads(&mut d, 5.0);
        }
    }
}
