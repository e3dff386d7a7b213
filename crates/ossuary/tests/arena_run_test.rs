//! Integration tests driving a whole [`World`] through short scripted fights.

use ossuary::combat::ProjectileKind;
use ossuary::config::HeroUnlocks;
use ossuary::shared::Vec2;
use ossuary::{AssetTable, EventBus, EventReceiver, HeroInput, LevelGrid, SimConfig, SimEvent, SpawnPolicy, World};

/// 12×9 room; the hero starts in cell (6, 4) with a pillar two cells east.
const ROOM: [&str; 9] = [
    "############",
    "#..........#",
    "#..........#",
    "#..........#",
    "#.......#..#",
    "#..........#",
    "#..........#",
    "#..........#",
    "############",
];

fn world_in(rows: &[&str], config: SimConfig) -> (World, EventReceiver) {
    let bus = EventBus::new(config.event_capacity);
    let receiver = bus.receiver();
    let level = LevelGrid::from_rows(rows, config.grid_cell_size);
    let world = World::new(config, level, AssetTable::default(), bus.sender()).unwrap();
    (world, receiver)
}

fn open_world(config: SimConfig) -> (World, EventReceiver) {
    let (events, receiver) = EventBus::create_pair(config.event_capacity);
    let level = LevelGrid::new(32, 32, config.grid_cell_size);
    let world = World::new(config, level, AssetTable::default(), events).unwrap();
    (world, receiver)
}

fn run(world: &mut World, frames: usize) {
    let dt = world.context().config.fixed_timestep;
    for _ in 0..frames {
        world.update(dt);
    }
}

fn all_unlocked() -> SimConfig {
    let mut config = SimConfig::default();
    config.hero.unlocks = HeroUnlocks::all();
    config
}

#[test]
fn test_config_file_drives_world() {
    let path = std::env::temp_dir().join(format!("ossuary_arena_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        seed = 99
        spawn_policy = "steal_oldest"

        [pools]
        orb = 2

        [hero.unlocks]
        shooting = true
        "#,
    )
    .unwrap();
    let config = SimConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let (mut world, receiver) = open_world(config);
    let aim = world.hero().position + Vec2::new(200.0, 0.0);
    world.set_input(HeroInput {
        aim,
        shoot: true,
        ..HeroInput::default()
    });
    world.update(1.0 / 60.0);

    assert_eq!(world.projectiles().live_count_of(ProjectileKind::Orb), 2);
    let events = receiver.drain();
    assert!(!events.iter().any(|e| matches!(e, SimEvent::PoolExhausted { .. })));
}

#[test]
fn test_skip_policy_reports_dropped_orb() {
    let mut config = all_unlocked();
    config.pools.orb = 2;
    config.spawn_policy = SpawnPolicy::Skip;
    let (mut world, receiver) = open_world(config);

    let aim = world.hero().position + Vec2::new(200.0, 0.0);
    world.set_input(HeroInput {
        aim,
        shoot: true,
        ..HeroInput::default()
    });
    world.update(1.0 / 60.0);

    assert_eq!(world.projectiles().live_count_of(ProjectileKind::Orb), 2);
    let dropped = receiver
        .drain()
        .into_iter()
        .filter(|e| *e == SimEvent::PoolExhausted { kind: ProjectileKind::Orb })
        .count();
    assert_eq!(dropped, 1);
}

#[test]
fn test_hand_of_death_collects_souls() {
    let (mut world, receiver) = open_world(all_unlocked());
    let centre = world.hero().position;
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_4;
        world.spawn_meat_ball(centre + Vec2::from_angle(angle) * 100.0);
    }

    world.set_input(HeroInput {
        aim: centre,
        hand_of_death: true,
        ..HeroInput::default()
    });
    world.update(1.0 / 60.0);

    assert_eq!(world.mobs().live_count(), 3);
    assert_eq!(world.stats().kills, 5);
    let state = world.hero().hero_state().unwrap();
    assert_eq!((state.souls, state.level), (5, 1));

    let events = receiver.drain();
    let killed = events.iter().filter(|e| matches!(e, SimEvent::MobKilled { .. })).count();
    assert_eq!(killed, 5);
    assert!(events.contains(&SimEvent::LevelUp { level: 1, souls: 5 }));
}

#[test]
fn test_bone_spear_respects_pillar() {
    let (mut world, _receiver) = world_in(&ROOM, all_unlocked());
    let hero = world.hero().position;
    assert_eq!(hero, Vec2::new(104.0, 72.0));

    // Cell (10, 4) is behind the pillar at (8, 4)
    world.set_input(HeroInput {
        aim: Vec2::new(168.0, 72.0),
        bone_spear: true,
        ..HeroInput::default()
    });
    run(&mut world, 1);
    assert_eq!(world.projectiles().live_count(), 0);

    let target = Vec2::new(104.0, 120.0);
    let slot = world.spawn_meat_ball(target).unwrap();
    world.set_input(HeroInput {
        aim: target,
        bone_spear: true,
        ..HeroInput::default()
    });
    run(&mut world, 15);

    assert_eq!(world.mobs().get(slot).unwrap().health, 5);
}

#[test]
fn test_long_fight_stays_within_capacity() {
    let config = all_unlocked();
    let particle_capacity = config.particle_capacity;
    let mob_capacity = config.mob_capacity;
    let (mut world, receiver) = open_world(config);
    let centre = world.hero().position;

    let frames = 1200_u64;
    for tick in 0..frames {
        if tick % 60 == 0 {
            for i in 0..6 {
                let angle = i as f32 + tick as f32 * 0.1;
                world.spawn_meat_ball(centre + Vec2::from_angle(angle) * 120.0);
            }
        }
        let aim = world
            .mobs()
            .iter()
            .map(|(_, mob)| mob.position)
            .next()
            .unwrap_or(centre);
        world.set_input(HeroInput {
            aim,
            swing: tick % 2 == 0,
            shoot: true,
            dash: tick % 45 == 0,
            hand_of_death: true,
            bone_spear: true,
            ..HeroInput::default()
        });
        world.update(1.0 / 60.0);
        receiver.drain();

        let stats = world.stats();
        assert!(stats.live_particles <= particle_capacity);
        assert!(stats.live_mobs <= mob_capacity);
        assert!(stats.live_projectiles <= 6);
    }

    let stats = world.stats();
    assert_eq!(stats.ticks, frames);
    assert_eq!(stats.fixed_steps, frames / 2);
    assert!(stats.kills > 0);
}

#[test]
fn test_full_channel_never_stalls() {
    let mut config = SimConfig::default();
    config.hero.damage = 10;
    let bus = EventBus::new(1);
    let receiver = bus.receiver();
    let level = LevelGrid::new(32, 32, config.grid_cell_size);
    let mut world = World::new(config, level, AssetTable::default(), bus.sender()).unwrap();

    let target = world.hero().position + Vec2::new(30.0, 0.0);
    world.spawn_meat_ball(target);
    world.set_input(HeroInput {
        aim: target,
        swing: true,
        ..HeroInput::default()
    });
    run(&mut world, 30);

    assert_eq!(world.stats().kills, 1);
    assert_eq!(receiver.pending_count(), 1);
}
