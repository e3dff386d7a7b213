//! # Particle Simulator
//!
//! Fixed-capacity particle buffer. Slots are allocated from a free stack,
//! integrated once per update in slot order, and recycled the update their
//! life runs out.
//!
//! ## Physics Table
//!
//! Each particle names a [`ParticlePhysics`] behaviour. Behaviours are plain
//! functions in a table indexed by that enum; nothing is boxed per particle.
//!
//! ```text
//! ┌────────┬──────────────────────────────────────────────┐
//! │ None   │ integration only                             │
//! │ Blood  │ data0 = target height, data1 = latch (0 / 1) │
//! │ Ground │ data0 = target height, data1 = bounce count  │
//! └────────┴──────────────────────────────────────────────┘
//! ```

use ossuary_core::{CoreError, CoreResult};
use ossuary_shared::REFERENCE_FPS;
use rand::{Rng, RngCore};

use crate::assets::VisualHandle;
use crate::fx::draw::{DrawSink, FxLayer};
use crate::fx::particle::{Particle, ParticlePhysics};
use crate::level::{cell_of, CollisionQuery};

/// Identifies one allocation of a particle slot.
///
/// The generation changes every time the slot is recycled, so ids held
/// after a particle died stop resolving instead of aliasing its successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleId {
    index: u32,
    generation: u32,
}

impl ParticleId {
    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Allocation generation of the slot.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// What physics behaviours may look at while a particle updates.
pub struct PhysicsEnv<'a> {
    /// Level collision.
    pub collision: &'a dyn CollisionQuery,
    /// Side of one grid cell in pixels.
    pub cell_size: f32,
    /// Randomness for behaviours that pick values from ranges.
    pub rng: &'a mut dyn RngCore,
}

impl PhysicsEnv<'_> {
    /// Returns `true` if the cell under `(p.x + offset_x, p.y + offset_y)`
    /// is solid.
    #[inline]
    pub fn is_colliding(&self, p: &Particle, offset_x: f32, offset_y: f32) -> bool {
        self.collision.has_collision(
            cell_of(p.x + offset_x, self.cell_size),
            cell_of(p.y + offset_y, self.cell_size),
        )
    }
}

type PhysicsFn = fn(&mut Particle, &mut PhysicsEnv<'_>);

/// Indexed by `ParticlePhysics as usize`.
const PHYSICS: [PhysicsFn; ParticlePhysics::COUNT] = [no_physics, blood_physics, ground_physics];

/// Fixed-capacity particle buffer.
pub struct ParticleSimulator {
    particles: Box<[Particle]>,
    generations: Box<[u32]>,
    live: Box<[bool]>,
    /// Top of stack is next out.
    free_list: Vec<u32>,
    live_count: usize,
}

impl ParticleSimulator {
    /// Creates a simulator with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit in a `u32`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "particle capacity must be > 0");
        let top = u32::try_from(capacity).expect("particle capacity must fit in u32");
        Self {
            particles: vec![Particle::default(); capacity].into_boxed_slice(),
            generations: vec![0; capacity].into_boxed_slice(),
            live: vec![false; capacity].into_boxed_slice(),
            free_list: (0..top).rev().collect(),
            live_count: 0,
        }
    }

    /// Total slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Slots currently live.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Slots currently free.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Takes a free slot and places a default particle at `(x, y)`.
    ///
    /// The particle has no life yet; unless the caller sets `life` it is
    /// recycled on the next update.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SimulatorFull`] when every slot is live.
    pub fn alloc(&mut self, visual: VisualHandle, x: f32, y: f32) -> CoreResult<ParticleId> {
        let index = self.free_list.pop().ok_or(CoreError::SimulatorFull {
            capacity: self.capacity(),
        })?;
        let slot = index as usize;
        self.particles[slot] = Particle::new(visual, x, y);
        self.live[slot] = true;
        self.live_count += 1;
        Ok(ParticleId {
            index,
            generation: self.generations[slot],
        })
    }

    /// Returns `true` while `id` refers to a live particle.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: ParticleId) -> bool {
        let slot = id.index();
        slot < self.live.len() && self.live[slot] && self.generations[slot] == id.generation
    }

    /// Live particle behind `id`.
    #[must_use]
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.is_alive(id).then(|| &self.particles[id.index()])
    }

    /// Live particle behind `id`, mutably.
    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        if self.is_alive(id) {
            Some(&mut self.particles[id.index()])
        } else {
            None
        }
    }

    /// Advances every live particle by `dt` seconds.
    ///
    /// `time_scale` slows or speeds up this simulator only; `None` means 1.
    /// Each particle loses life first. A particle whose life runs out is
    /// recycled and neither integrated nor handed to its physics behaviour.
    pub fn update(&mut self, dt: f32, time_scale: Option<f32>, env: &mut PhysicsEnv<'_>) {
        let dt = dt * time_scale.unwrap_or(1.0);
        let tmod = dt * REFERENCE_FPS;

        for slot in 0..self.particles.len() {
            if !self.live[slot] {
                continue;
            }
            let particle = &mut self.particles[slot];
            particle.life -= dt;
            if particle.life <= 0.0 {
                self.recycle(slot);
                continue;
            }
            particle.integrate(tmod);
            PHYSICS[particle.physics as usize](particle, &mut *env);
        }
    }

    /// Submits every live particle to `sink` under `layer`.
    pub fn draw(&self, layer: FxLayer, sink: &mut dyn DrawSink) {
        for (particle, _) in self.particles.iter().zip(self.live.iter()).filter(|(_, live)| **live) {
            sink.submit(layer, particle.sprite());
        }
    }

    /// Recycles every live particle.
    pub fn clear(&mut self) {
        for slot in 0..self.particles.len() {
            if self.live[slot] {
                self.recycle(slot);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn recycle(&mut self, slot: usize) {
        let particle = &mut self.particles[slot];
        particle.data0 = 0.0;
        particle.data1 = 0.0;
        particle.physics = ParticlePhysics::None;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.live_count -= 1;
        self.free_list.push(slot as u32);
    }
}

// ============================================================================
// PHYSICS BEHAVIOURS
// ============================================================================

fn no_physics(_particle: &mut Particle, _env: &mut PhysicsEnv<'_>) {}

/// Free fall until the first solid cell, then a one-time latch into a slow
/// smear. Freezes once it falls past its target height.
fn blood_physics(p: &mut Particle, env: &mut PhysicsEnv<'_>) {
    if p.data1 != 1.0 && env.is_colliding(p, 0.0, 0.0) {
        p.data1 = 1.0;
        p.dx *= 0.4;
        p.dy = 0.0;
        p.gravity_y = env.rng.gen_range(0.0..=0.001);
        p.friction = env.rng.gen_range(0.5..=0.7);
        p.scale_delta_y = env.rng.gen_range(0.0..=0.001);
        p.rotation_delta = 0.0;
        if env.is_colliding(p, -5.0, 0.0) || env.is_colliding(p, 5.0, 0.0) {
            p.scale_y *= env.rng.gen_range(1.0..=1.25);
        }
        if env.is_colliding(p, 0.0, -5.0) || env.is_colliding(p, 0.0, 5.0) {
            p.scale_x *= env.rng.gen_range(1.0..=1.25);
        }
    }
    if p.y >= p.data0 && p.dy > 0.0 {
        p.gravity_y = 0.0;
        p.dy = 0.0;
    }
}

/// Reflects off walls it is about to enter; settles on the first bounce and
/// hops on later ones.
fn ground_physics(p: &mut Particle, env: &mut PhysicsEnv<'_>) {
    if !env.is_colliding(p, 0.0, 0.0) {
        if env.is_colliding(p, 2.0 * sign(p.dx), 0.0) {
            p.dx = -p.dx * 0.7;
        }
        if env.is_colliding(p, 0.0, 2.0 * sign(p.dy)) {
            p.dy = -p.dy * 0.7;
        }
    }

    if env.is_colliding(p, 0.0, 0.0) || (p.y >= p.data0 && p.dy > 0.0) {
        p.data1 += 1.0;
        if p.data1 <= 1.0 {
            p.gravity_y = 0.0;
            p.dy = 0.0;
            p.dx *= 0.5;
            p.rotation_delta = 0.0;
        } else {
            p.dy = -p.dy;
            p.dx *= 0.6;
            p.rotation_delta *= 0.3;
        }
    }
}

/// -1, 0 or 1. Zero stays zero.
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
