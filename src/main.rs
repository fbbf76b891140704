//! Zone Director - Headless Runner
//!
//! Loads the director tables, spawns a random population from a seed and
//! runs the director for a number of ticks. Squads walk straight toward
//! their assigned target; every director event is logged.

use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use zone_director::core::clock::{SimClock, TimeOfDay};
use zone_director::core::error::Result;
use zone_director::core::types::{FactionId, ParticipantId, Placement, RegionId, Vec2};
use zone_director::director::{ClearReason, Director, DirectorEvent};
use zone_director::registry::participant::{HubKind, Participant};
use zone_director::rules::loader::load_director_dir;
use zone_director::world::oracle::WorldClock;

/// Headless Zone Director - squad target selection without a game attached
#[derive(Parser, Debug)]
#[command(name = "zone-director")]
#[command(about = "Run the simulation director over a random population")]
struct Args {
    /// Directory holding config.toml, factions.toml and weights.toml
    #[arg(long, default_value = "data/director")]
    data: PathBuf,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Squads to spawn
    #[arg(long, default_value_t = 12)]
    squads: u32,

    /// Location hubs to spawn
    #[arg(long, default_value_t = 8)]
    hubs: u32,

    /// Number of regions (levels)
    #[arg(long, default_value_t = 2)]
    regions: u32,

    /// Side length of each square region
    #[arg(long, default_value_t = 200.0)]
    size: f32,

    /// Distance a squad covers per tick
    #[arg(long, default_value_t = 1.5)]
    speed: f32,

    /// Time of day at tick 0, "HH:MM"
    #[arg(long, default_value = "06:00")]
    start: String,

    /// Toggle the surge every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    surge_every: u64,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

/// Final run summary
#[derive(Serialize, Default)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    assignments: u32,
    arrivals: u32,
    lost_targets: u32,
    ineligible_targets: u32,
    relocations: u32,
    assigned_at_end: u32,
}

const FACTIONS: [&str; 3] = ["stalker", "bandit", "military"];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("zone_director=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (config, rules) = load_director_dir(&args.data, &[])?;
    let start = TimeOfDay::parse(&args.start).unwrap_or_else(|| {
        tracing::warn!("Invalid start time {:?}, using 06:00", args.start);
        TimeOfDay::new(6, 0)
    });
    let clock = SimClock::new(config.ticks_per_day).starting_at(start);
    let mut director = Director::new(config, rules)?.with_clock(clock);

    spawn_population(&mut director, &args, &mut rng)?;
    tracing::info!(
        "Spawned {} participants (seed {}), running {} ticks",
        director.registry().len(),
        seed,
        args.ticks
    );

    let mut summary = RunSummary {
        seed,
        ticks: args.ticks,
        ..Default::default()
    };

    for _ in 0..args.ticks {
        let tick = director.clock().current_tick();
        if args.surge_every > 0 && tick > 0 && tick % args.surge_every == 0 {
            let surge = !director.clock().surge_active();
            director.set_surge(surge);
            tracing::info!("Tick {}: surge {}", tick, if surge { "started" } else { "ended" });
        }

        for event in director.tick() {
            record(&mut summary, &event);
            log_event(tick, &event);
        }

        move_squads(&mut director, args.speed)?;
    }

    summary.assigned_at_end = director
        .registry()
        .iter()
        .filter_map(|p| p.as_squad())
        .filter(|s| s.is_assigned())
        .count() as u32;

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
    } else {
        print_summary(&director, &summary);
    }

    Ok(())
}

fn spawn_population(director: &mut Director, args: &Args, rng: &mut ChaCha8Rng) -> Result<()> {
    let regions = args.regions.max(1);
    let mut next_id = 1u32;
    let random_placement = |rng: &mut ChaCha8Rng| {
        Placement::new(
            Vec2::new(rng.gen_range(0.0..args.size), rng.gen_range(0.0..args.size)),
            RegionId(rng.gen_range(1..=regions)),
        )
    };

    for _ in 0..args.hubs {
        let kind = HubKind::ALL[rng.gen_range(0..HubKind::ALL.len())];
        let capacity = rng.gen_range(1..=4);
        let hub = Participant::hub(ParticipantId(next_id), kind.key(), kind, random_placement(rng), capacity);
        director.spawn(hub)?;
        next_id += 1;
    }

    for _ in 0..args.squads {
        let faction = FACTIONS[rng.gen_range(0..FACTIONS.len())];
        let members = rng.gen_range(1..=6);
        let squad = Participant::squad(
            ParticipantId(next_id),
            faction,
            FactionId::new(faction),
            random_placement(rng),
            members,
        );
        director.spawn(squad)?;
        // roughly half the squads start abstracted
        if rng.gen_bool(0.5) {
            director.set_squad_offline(ParticipantId(next_id), true)?;
        }
        next_id += 1;
    }

    director.spawn(Participant::player(ParticipantId(next_id), random_placement(rng)))?;
    Ok(())
}

/// Step every assigned squad straight toward its target
fn move_squads(director: &mut Director, speed: f32) -> Result<()> {
    let moves: Vec<(ParticipantId, Vec2, RegionId)> = director
        .registry()
        .iter()
        .filter_map(|p| {
            let target = p.as_squad()?.assigned_target()?;
            let goal = director.registry().get(target)?.placement;
            if goal.region != p.placement.region {
                return None;
            }
            let delta = goal.position - p.placement.position;
            let step = if delta.length() <= speed {
                delta
            } else {
                delta.normalize() * speed
            };
            Some((p.id, p.placement.position + step, p.placement.region))
        })
        .collect();

    for (id, position, region) in moves {
        director.move_participant(id, position, region)?;
    }
    Ok(())
}

fn record(summary: &mut RunSummary, event: &DirectorEvent) {
    match event {
        DirectorEvent::SquadAssigned { .. } => summary.assignments += 1,
        DirectorEvent::TargetReached { .. } => summary.arrivals += 1,
        DirectorEvent::SquadRelocated { .. } => summary.relocations += 1,
        DirectorEvent::AssignmentCleared { reason, .. } => match reason {
            ClearReason::TargetLost => summary.lost_targets += 1,
            ClearReason::TargetIneligible => summary.ineligible_targets += 1,
            ClearReason::Completed => {}
        },
        _ => {}
    }
}

fn log_event(tick: u64, event: &DirectorEvent) {
    match event {
        DirectorEvent::SquadAssigned { squad, target, score } => {
            tracing::info!("[{}] {} -> {} (score {:.2})", tick, squad, target, score)
        }
        DirectorEvent::AssignmentCleared { squad, target, reason } => {
            tracing::info!("[{}] {} dropped {} ({:?})", tick, squad, target, reason)
        }
        DirectorEvent::TargetReached { squad, target } => {
            tracing::info!("[{}] {} reached {}", tick, squad, target)
        }
        other => tracing::debug!("[{}] {:?}", tick, other),
    }
}

fn print_summary(director: &Director, summary: &RunSummary) {
    println!("\n=== ZONE DIRECTOR ===");
    println!("Seed: {}  Ticks: {}", summary.seed, summary.ticks);
    println!(
        "Assignments: {}  Arrivals: {}  Relocations: {}",
        summary.assignments, summary.arrivals, summary.relocations
    );
    println!(
        "Cleared: {} lost, {} ineligible",
        summary.lost_targets, summary.ineligible_targets
    );
    println!();

    for participant in director.registry().iter() {
        let Some(squad) = participant.as_squad() else {
            continue;
        };
        let target = squad
            .assigned_target()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".into());
        let stationed = squad
            .stationed_at
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".into());
        let top = director
            .rank_candidates(participant.id)
            .ok()
            .and_then(|ranked| ranked.first().copied())
            .map(|(id, score)| format!("{} ({:.2})", id, score))
            .unwrap_or_else(|| "none".into());
        println!(
            "  {} {:<9} target {:<5} stationed {:<5} best now {}",
            participant.id,
            squad.faction.as_str(),
            target,
            stationed,
            top
        );
    }
}
