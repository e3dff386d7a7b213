//! # Visual Effects
//!
//! [`ParticleSimulator`] does the physics. [`Fx`] sorts its particles into
//! the four presentation layers and owns the catalogue of bursts gameplay
//! asks for (explosions, dust, sparkles, shadows).
//!
//! A burst that outgrows the simulator is cut short: the particles already
//! allocated play, the rest are dropped.

mod draw;
mod particle;
mod simulator;

pub use draw::{Color, DrawSink, FxLayer, SpriteInstance};
pub use particle::{Particle, ParticlePhysics};
pub use simulator::{ParticleId, ParticleSimulator, PhysicsEnv};

use std::f32::consts::TAU;

use rand::Rng;

use crate::assets::{AssetTable, VisualHandle, GIB_VARIANTS};

/// Tint of dust kicked up from the floor.
const DUST_COLOR: u32 = 0xef_dd_c0;
/// Tint of meat ball gibs.
const MEAT_RED: u32 = 0x99_45_51;
/// Tint of level-up sparkles.
const SPARKLE_COLOR: u32 = 0xfc_f0_a4;

/// Layered effect catalogue on top of one particle simulator.
pub struct Fx {
    simulator: ParticleSimulator,
    /// Ids per layer, indexed by `FxLayer::index`.
    batches: [Vec<ParticleId>; FxLayer::COUNT],
}

impl Fx {
    /// Creates the effect system with `capacity` particle slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            simulator: ParticleSimulator::new(capacity),
            batches: std::array::from_fn(|_| Vec::with_capacity(capacity)),
        }
    }

    /// The underlying simulator.
    #[inline]
    #[must_use]
    pub fn simulator(&self) -> &ParticleSimulator {
        &self.simulator
    }

    /// Ids currently in `layer`, in allocation order.
    #[inline]
    #[must_use]
    pub fn batch(&self, layer: FxLayer) -> &[ParticleId] {
        &self.batches[layer.index()]
    }

    /// Live particles across every layer.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.simulator.live_count()
    }

    /// Advances every particle, then drops ids whose particle died.
    pub fn update(&mut self, dt: f32, time_scale: Option<f32>, env: &mut PhysicsEnv<'_>) {
        self.simulator.update(dt, time_scale, env);
        let simulator = &self.simulator;
        for batch in &mut self.batches {
            batch.retain(|id| simulator.is_alive(*id));
        }
    }

    /// Submits every layer to `sink`, background first.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        for layer in FxLayer::ALL {
            for id in self.batch(layer) {
                if let Some(particle) = self.simulator.get(*id) {
                    sink.submit(layer, particle.sprite());
                }
            }
        }
    }

    /// Drops every particle.
    pub fn clear(&mut self) {
        self.simulator.clear();
        for batch in &mut self.batches {
            batch.clear();
        }
    }

    /// Allocates into `layer`. Returns `None` when the simulator is full.
    pub fn alloc(&mut self, layer: FxLayer, visual: VisualHandle, x: f32, y: f32) -> Option<&mut Particle> {
        match self.simulator.alloc(visual, x, y) {
            Ok(id) => {
                self.batches[layer.index()].push(id);
                self.simulator.get_mut(id)
            }
            Err(err) => {
                tracing::trace!(error = %err, ?layer, "particle dropped");
                None
            }
        }
    }

    // ========================================================================
    // CATALOGUE
    // ========================================================================

    /// Small shadow under a hovering object for `duration` seconds.
    pub fn shadow_small(&mut self, assets: &AssetTable, x: f32, y: f32, duration: f32) {
        if let Some(p) = self.alloc(FxLayer::BgNormal, assets.shadow_small, x, y) {
            p.life = duration;
        }
    }

    /// Eyes, legs and fifty gibs thrown out of a dead meat ball. Every piece
    /// smears on the first wall it meets.
    ///
    /// Returns how many particles were spawned.
    pub fn meat_ball_explode<R: Rng>(&mut self, assets: &AssetTable, rng: &mut R, x: f32, y: f32) -> usize {
        let mut spawned = 0;
        let pieces = [
            (assets.fx_big_eye, 1, Color::WHITE),
            (assets.fx_little_eye, 1, Color::WHITE),
            (assets.fx_meat_leg, 2, Color::WHITE),
        ];
        for (visual, count, color) in pieces {
            for _ in 0..count {
                if !self.spawn_gore(rng, visual, color, x, y) {
                    return spawned;
                }
                spawned += 1;
            }
        }

        let meat = Color::from_rgb_hex(MEAT_RED);
        for _ in 0..50 {
            let visual = assets.fx_gibs[rng.gen_range(0..GIB_VARIANTS)];
            if !self.spawn_gore(rng, visual, meat, x, y) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// `count` dust specks that hop along the floor and settle.
    pub fn dirt_debris<R: Rng>(&mut self, assets: &AssetTable, rng: &mut R, x: f32, y: f32, count: usize) {
        let dust = Color::from_rgb_hex(DUST_COLOR);
        for _ in 0..count {
            let speed = rng.gen_range(0.5..=1.5);
            let dx = random_sign(rng, speed);
            let dy = -rng.gen_range(0.5..=1.5);
            let gravity = about(rng, 0.08, 0.1);
            let target = y + rng.gen_range(0.0..=4.0);
            let spin = rng.gen_range(-0.2..=0.2);
            let alpha = rng.gen_range(0.6..=1.0);
            let life = rng.gen_range(0.6..=1.2);
            let Some(p) = self.alloc(FxLayer::BgNormal, assets.fx_dust, x, y) else {
                return;
            };
            p.color = dust;
            p.dx = dx;
            p.dy = dy;
            p.gravity_y = gravity;
            p.friction = 0.96;
            p.rotation_delta = spin;
            p.data0 = target;
            p.alpha = alpha;
            p.life = life;
            p.physics = ParticlePhysics::Ground;
        }
    }

    /// Additive sparkles rising around a levelling hero.
    pub fn level_up<R: Rng>(&mut self, assets: &AssetTable, rng: &mut R, x: f32, y: f32) {
        let sparkle = Color::from_rgb_hex(SPARKLE_COLOR);
        for _ in 0..12 {
            let px = x + rng.gen_range(-8.0..=8.0);
            let py = y + rng.gen_range(-4.0..=0.0);
            let dx = rng.gen_range(-0.3..=0.3);
            let dy = -rng.gen_range(0.5..=1.2);
            let scale = rng.gen_range(0.5..=1.0);
            let life = rng.gen_range(0.4..=0.8);
            let Some(p) = self.alloc(FxLayer::TopAdd, assets.fx_sparkle, px, py) else {
                return;
            };
            p.color = sparkle;
            p.dx = dx;
            p.dy = dy;
            p.gravity_y = -0.01;
            p.friction = 0.92;
            p.scale_x = scale;
            p.scale_y = scale;
            p.scale_delta_x = -0.01;
            p.scale_delta_y = -0.01;
            p.life = life;
        }
    }

    fn spawn_gore<R: Rng>(&mut self, rng: &mut R, visual: VisualHandle, color: Color, x: f32, y: f32) -> bool {
        let speed_x = f32::from(rng.gen_range(0_u8..=2));
        let dx = random_sign(rng, speed_x);
        let speed_y = f32::from(rng.gen_range(1_u8..=2));
        let dy = random_sign(rng, speed_y);
        let gravity = about(rng, 0.1, 0.1);
        let friction = about(rng, 0.94, 0.05).min(1.0);
        let spin = rng.gen_range(0.0..=TAU);
        let target = y + f32::from(rng.gen_range(0_u8..=12));
        let alpha = rng.gen_range(0.7..=1.0);
        let life = f32::from(rng.gen_range(1_u8..=2));

        let Some(p) = self.alloc(FxLayer::TopNormal, visual, x, y) else {
            return false;
        };
        p.color = color;
        p.dx = dx;
        p.dy = dy;
        p.gravity_y = gravity;
        p.friction = friction;
        p.rotation_delta = spin;
        p.data0 = target;
        p.alpha = alpha;
        p.life = life;
        p.physics = ParticlePhysics::Blood;
        true
    }
}

/// `value` scaled by a random factor within `±variance`.
fn about<R: Rng>(rng: &mut R, value: f32, variance: f32) -> f32 {
    value * rng.gen_range(1.0 - variance..=1.0 + variance)
}

/// `value` with a random sign.
fn random_sign<R: Rng>(rng: &mut R, value: f32) -> f32 {
    if rng.gen_bool(0.5) {
        value
    } else {
        -value
    }
}
