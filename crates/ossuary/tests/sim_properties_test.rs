//! Integration tests for the simulation primitives as gameplay sees them:
//! pools, timers, effects, particle physics and projectile hits.

use std::cell::Cell;

use ossuary::actor::{Actor, Behavior};
use ossuary::combat::{Launch, ProjectileKind, Projectiles, Transform};
use ossuary::config::{PoolSizes, SpawnPolicy};
use ossuary::core::{CoreError, Cooldowns, EffectKind, Effectible, Effects, ObjectPool};
use ossuary::fx::{ParticlePhysics, ParticleSimulator, PhysicsEnv};
use ossuary::shared::{Vec2, REFERENCE_FPS};
use ossuary::{CollisionQuery, EventBus, LevelGrid, VisualHandle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Open everywhere; counts how often it was asked.
#[derive(Default)]
struct CountingQuery {
    calls: Cell<usize>,
}

impl CollisionQuery for CountingQuery {
    fn has_collision(&self, _cx: i32, _cy: i32) -> bool {
        self.calls.set(self.calls.get() + 1);
        false
    }
}

#[derive(Default)]
struct Dummy {
    effects: Effects,
    ended: Vec<EffectKind>,
}

impl Effectible for Dummy {
    fn effects(&self) -> &Effects {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    fn on_effect_end(&mut self, kind: EffectKind) {
        self.ended.push(kind);
    }
}

#[test]
fn test_pool_exhausts_then_recovers() {
    let mut pool: ObjectPool<u32> = ObjectPool::new(4, |i| i as u32);
    let handles: Vec<_> = (0..4).map(|_| pool.alloc().unwrap()).collect();

    assert_eq!(pool.alloc(), Err(CoreError::PoolExhausted { capacity: 4 }));

    pool.free(handles[2]).unwrap();
    let again = pool.alloc().unwrap();
    assert_eq!(again.index(), handles[2].index());
    assert_eq!(pool.get(again), Some(&2));
}

#[test]
fn test_cooldown_fires_exactly_once() {
    let mut cd: Cooldowns<&str> = Cooldowns::new();
    cd.set_with("x", 1.0, "fire");

    cd.advance(0.5);
    assert!(cd.has("x"));
    assert!((cd.ratio("x").unwrap() - 0.5).abs() < 1e-6);
    assert!(cd.pop_expired().is_none());

    cd.advance(0.6);
    assert!(!cd.has("x"));
    assert_eq!(cd.pop_expired().map(|e| e.action), Some("fire"));
    assert!(cd.pop_expired().is_none());

    cd.advance(1.0);
    assert!(cd.pop_expired().is_none());
}

#[test]
fn test_rearm_replaces_deadline() {
    let mut cd: Cooldowns<u8> = Cooldowns::new();
    cd.set_with("x", 1.0, 1);
    cd.advance(0.5);
    cd.set_with("x", 2.0, 2);

    cd.advance(1.0);
    assert!(cd.has("x"));
    assert!(cd.pop_expired().is_none());

    cd.advance(1.0);
    assert_eq!(cd.pop_expired().map(|e| e.action), Some(2));
    assert!(cd.pop_expired().is_none());
}

#[test]
fn test_stun_ends_once() {
    let mut dummy = Dummy::default();
    dummy.add_effect(EffectKind::Stun, 0.3);

    dummy.update_effects(0.3);
    assert!(!dummy.has_effect(EffectKind::Stun));
    assert_eq!(dummy.ended, vec![EffectKind::Stun]);

    dummy.update_effects(0.3);
    assert_eq!(dummy.ended.len(), 1);
}

#[test]
fn test_expired_particle_skips_physics() {
    let query = CountingQuery::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut sim = ParticleSimulator::new(8);

    let id = sim.alloc(VisualHandle(1), 10.0, 10.0).unwrap();
    let p = sim.get_mut(id).unwrap();
    p.life = 1.0;
    p.physics = ParticlePhysics::Blood;

    let mut env = PhysicsEnv {
        collision: &query,
        cell_size: 16.0,
        rng: &mut rng,
    };
    sim.update(1.1, None, &mut env);

    assert_eq!(sim.live_count(), 0);
    assert!(!sim.is_alive(id));
    assert_eq!(query.calls.get(), 0);
}

#[test]
fn test_ground_particle_bounces() {
    let query = CountingQuery::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut sim = ParticleSimulator::new(8);
    let dt = 1.0 / REFERENCE_FPS;

    let id = sim.alloc(VisualHandle(1), 100.0, 100.0).unwrap();
    let p = sim.get_mut(id).unwrap();
    p.life = 5.0;
    p.dx = 2.0;
    p.dy = 1.0;
    p.gravity_y = 0.5;
    p.rotation_delta = 0.5;
    p.data0 = 100.0;
    p.physics = ParticlePhysics::Ground;

    let mut env = PhysicsEnv {
        collision: &query,
        cell_size: 16.0,
        rng: &mut rng,
    };

    // First bounce settles
    sim.update(dt, None, &mut env);
    let p = *sim.get(id).unwrap();
    assert_eq!(p.data1, 1.0);
    assert_eq!(p.dy, 0.0);
    assert_eq!(p.gravity_y, 0.0);
    assert_eq!(p.dx, 1.0);

    // Second bounce hops back up
    sim.get_mut(id).unwrap().dy = 1.0;
    sim.get_mut(id).unwrap().rotation_delta = 0.5;
    sim.update(dt, None, &mut env);
    let p = *sim.get(id).unwrap();
    assert_eq!(p.data1, 2.0);
    assert_eq!(p.dy, -1.0);
    assert!((p.dx - 0.6).abs() < 1e-6);
    assert!((p.rotation_delta - 0.15).abs() < 1e-6);
}

#[test]
fn test_boundary_target_hit_once_per_activation() {
    let (events, _receiver) = EventBus::create_pair(8);
    let level = LevelGrid::new(16, 16, 16.0);
    let reach = 20.0;
    let radius = 7.0;

    let mut mobs = ObjectPool::new(1, |_| Actor::new(Vec2::ZERO, radius, 100, 0.0, Behavior::MeatBall));
    let slot = mobs.alloc().unwrap();
    mobs.get_mut(slot).unwrap().position = Vec2::new(reach + radius, 0.0);

    let mut projectiles = Projectiles::new(&PoolSizes::default(), SpawnPolicy::Skip);
    let launch = Launch {
        transform: Transform::default(),
        reach,
        damage: 5,
        lifetime: 0.3,
        ..Launch::default()
    };
    projectiles.spawn(ProjectileKind::Swipe, &launch, &events).unwrap();

    let mut hits = 0;
    for _ in 0..10 {
        hits += projectiles.update(0.05, &level, 16.0, &mut mobs);
    }

    assert_eq!(hits, 1);
    assert_eq!(mobs.get(slot).unwrap().health, 95);
    assert_eq!(projectiles.live_count(), 0);
}
