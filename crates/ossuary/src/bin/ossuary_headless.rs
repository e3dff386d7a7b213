//! # Headless Run
//!
//! Drives a [`World`] without a window: a walled arena, a scripted hero and
//! waves of meat balls. Prints frame statistics and the notifications the
//! run produced.
//!
//! ```text
//! ossuary_headless [config.toml] [ticks]
//! ```
//!
//! Set `RUST_LOG=ossuary=debug` to see spawns and exhaustion.

use std::collections::BTreeMap;
use std::process::ExitCode;

use ossuary::config::HeroUnlocks;
use ossuary::shared::{Vec2, TICK_RATE};
use ossuary::{AssetTable, EventBus, HeroInput, LevelGrid, SimConfig, SimEvent, World};
use tracing_subscriber::filter::EnvFilter;

const DEFAULT_TICKS: u64 = 1800;

/// Frames between meat ball waves.
const WAVE_INTERVAL: u64 = 120;

const ARENA: [&str; 16] = [
    "########################",
    "#......................#",
    "#......................#",
    "#...##............##...#",
    "#...##............##...#",
    "#......................#",
    "#......................#",
    "#..........##..........#",
    "#..........##..........#",
    "#......................#",
    "#......................#",
    "#...##............##...#",
    "#...##............##...#",
    "#......................#",
    "#......................#",
    "########################",
];

/// Cells meat balls appear in, one per wave member.
const SPAWN_CELLS: [(i32, i32); 4] = [(2, 2), (21, 2), (2, 13), (21, 13)];

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Walks in a slow circle, fights whatever is closest.
fn scripted_input(world: &World, tick: u64) -> HeroInput {
    let hero = world.hero().position;
    #[allow(clippy::cast_precision_loss)]
    let heading = Vec2::from_angle(tick as f32 * 0.02);

    let nearest = world
        .mobs()
        .iter()
        .filter(|(_, mob)| mob.is_alive())
        .map(|(_, mob)| mob.position)
        .min_by(|a, b| hero.distance_squared(*a).total_cmp(&hero.distance_squared(*b)));

    let Some(target) = nearest else {
        return HeroInput {
            movement: heading,
            aim: hero + heading,
            ..HeroInput::default()
        };
    };

    let close = hero.distance_squared(target) < 48.0 * 48.0;
    HeroInput {
        movement: heading,
        aim: target,
        swing: close,
        shoot: !close,
        dash: close && tick % 90 == 0,
        hand_of_death: world.mobs().live_count() >= 6,
        bone_spear: !close,
    }
}

fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args().skip(1);
    let mut config = match args.next() {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };
    let ticks = match args.next().map(|raw| raw.parse::<u64>()) {
        Some(Ok(ticks)) => ticks,
        Some(Err(err)) => {
            tracing::error!(error = %err, "tick count must be a whole number");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_TICKS,
    };
    config.hero.unlocks = HeroUnlocks::all();

    let bus = EventBus::new(config.event_capacity);
    let receiver = bus.receiver();
    let level = LevelGrid::from_rows(&ARENA, config.grid_cell_size);
    let mut world = match World::new(config, level, AssetTable::default(), bus.sender()) {
        Ok(world) => world,
        Err(err) => {
            tracing::error!(error = %err, "could not build world");
            return ExitCode::FAILURE;
        }
    };

    #[allow(clippy::cast_precision_loss)]
    let dt = 1.0 / TICK_RATE as f32;
    let mut tally: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut ran = 0;

    for tick in 0..ticks {
        if tick % WAVE_INTERVAL == 0 {
            for (cx, cy) in SPAWN_CELLS {
                let at = world.context().level.cell_center(cx, cy);
                world.spawn_meat_ball(at);
            }
        }

        world.set_input(scripted_input(&world, tick));
        world.update(dt);
        ran = tick + 1;

        let mut over = false;
        for event in receiver.drain() {
            let name = match event {
                SimEvent::AttackFired { .. } => "attack_fired",
                SimEvent::HeroHit { .. } => "hero_hit",
                SimEvent::HeroDied { .. } => {
                    over = true;
                    "hero_died"
                }
                SimEvent::MobKilled { .. } => "mob_killed",
                SimEvent::LevelUp { .. } => "level_up",
                SimEvent::PoolExhausted { .. } => "pool_exhausted",
            };
            *tally.entry(name).or_default() += 1;
        }

        if tick % u64::from(TICK_RATE) == 0 {
            let stats = world.stats();
            tracing::debug!(
                tick,
                particles = stats.live_particles,
                projectiles = stats.live_projectiles,
                mobs = stats.live_mobs,
                "frame"
            );
        }
        if over {
            tracing::info!(tick, "run over");
            break;
        }
    }

    let stats = world.stats();
    let hero = world.hero();
    let (souls, level) = hero.hero_state().map_or((0, 0), |state| (state.souls, state.level));

    println!("┌─ OSSUARY HEADLESS RUN ───────────────────────────────────────────┐");
    println!("│ Frames:             {ran}");
    println!("│ Fixed steps:        {}", stats.fixed_steps);
    println!("│ Kills:              {}", stats.kills);
    println!("│ Live mobs:          {}", stats.live_mobs);
    println!("│ Live projectiles:   {}", stats.live_projectiles);
    println!("│ Live particles:     {}", stats.live_particles);
    println!("│ Hero health:        {}", hero.health);
    println!("│ Souls / level:      {souls} / {level}");
    println!("├─ NOTIFICATIONS ──────────────────────────────────────────────────┤");
    for (name, count) in &tally {
        println!("│ {name:<20}{count}");
    }
    println!("└──────────────────────────────────────────────────────────────────┘");

    ExitCode::SUCCESS
}
