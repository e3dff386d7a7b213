//! Projectile state machine.
//!
//! ```text
//!          activate            own timer / condition
//!   Idle ───────────> Active ─────────────────────────> Finished
//!    ^                                                     │
//!    └──────────────── release (by the owning pool) ───────┘
//! ```
//!
//! An idle or finished projectile is inert: `update` does nothing and it
//! strikes nothing.

use ossuary_core::{lifecycle_violation, CoreError, ObjectPool};
use ossuary_shared::Vec2;

use crate::assets::VisualHandle;
use crate::combat::hits::{resolve_first_hit, resolve_hits, HitTarget, Strike};
use crate::fx::SpriteInstance;
use crate::level::{cell_of, CollisionQuery};

/// The three projectile types the hero fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProjectileKind {
    /// Melee arc in front of the hero.
    Swipe = 0,
    /// Travelling orb.
    Orb = 1,
    /// Spear erupting at a target point.
    BoneSpear = 2,
}

impl ProjectileKind {
    /// Number of kinds.
    pub const COUNT: usize = 3;

    /// Every kind, in pool order.
    pub const ALL: [Self; Self::COUNT] = [Self::Swipe, Self::Orb, Self::BoneSpear];

    /// Position in [`ProjectileKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Lifecycle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjectilePhase {
    /// Pooled and disabled.
    #[default]
    Idle,
    /// Simulated every tick.
    Active,
    /// Done; waiting for the pool to take it back.
    Finished,
}

/// Placement of a projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Centre in pixels.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Mirrored vertically, for attacks aimed to the left.
    pub flip_y: bool,
}

/// Everything attack logic hands a projectile when it activates it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Launch {
    /// Initial placement.
    pub transform: Transform,
    /// Attacker position. Knockback points away from it.
    pub attacker: Vec2,
    /// Pixels per second. Only orbs move.
    pub velocity: Vec2,
    /// Strike radius.
    pub reach: f32,
    /// Damage per target.
    pub damage: i32,
    /// Knockback speed per target.
    pub knockback: f32,
    /// Seconds the projectile stays active after striking; for orbs, the
    /// flight time.
    pub lifetime: f32,
    /// Seconds before the strike. Only bone spears wait.
    pub windup: f32,
}

/// One pooled projectile.
#[derive(Clone, Debug)]
pub struct Projectile {
    kind: ProjectileKind,
    phase: ProjectilePhase,
    launch: Launch,
    transform: Transform,
    /// Counts down the windup before the strike, then the time left.
    timer: f32,
    struck: bool,
    serial: u64,
}

impl Projectile {
    /// An idle projectile of `kind`.
    #[must_use]
    pub fn new(kind: ProjectileKind) -> Self {
        Self {
            kind,
            phase: ProjectilePhase::Idle,
            launch: Launch::default(),
            transform: Transform::default(),
            timer: 0.0,
            struck: false,
            serial: 0,
        }
    }

    /// Kind fixed at construction.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> ProjectilePhase {
        self.phase
    }

    /// Returns `true` while simulated.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == ProjectilePhase::Active
    }

    /// Current placement.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Activation order stamp; lower is older.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Returns `true` once the strike happened this activation.
    #[inline]
    #[must_use]
    pub fn has_struck(&self) -> bool {
        self.struck
    }

    /// Idle → Active.
    ///
    /// Activating a projectile that is not idle is a lifecycle bug and is
    /// otherwise ignored.
    pub fn activate(&mut self, launch: &Launch, serial: u64) {
        if self.phase != ProjectilePhase::Idle {
            lifecycle_violation(&CoreError::InvalidState("activate on a projectile that is not idle"));
            return;
        }
        self.phase = ProjectilePhase::Active;
        self.launch = *launch;
        self.transform = launch.transform;
        self.struck = false;
        self.serial = serial;
        self.timer = match self.kind {
            ProjectileKind::Swipe => 0.0,
            ProjectileKind::Orb => launch.lifetime,
            ProjectileKind::BoneSpear => launch.windup,
        };
    }

    /// Active → Finished. No-op in any other phase.
    pub fn finish(&mut self) {
        if self.phase == ProjectilePhase::Active {
            self.phase = ProjectilePhase::Finished;
        }
    }

    /// Finished → Idle. Called by the owning pool right before the slot is
    /// freed.
    pub fn release(&mut self) {
        match self.phase {
            ProjectilePhase::Finished => {
                self.phase = ProjectilePhase::Idle;
                self.struck = false;
                self.timer = 0.0;
            }
            ProjectilePhase::Idle => {
                lifecycle_violation(&CoreError::InvalidState("release of an idle projectile"));
            }
            ProjectilePhase::Active => {
                lifecycle_violation(&CoreError::InvalidState("release of an active projectile"));
            }
        }
    }

    /// Advances an active projectile by `dt` seconds.
    ///
    /// Returns how many targets were struck this tick.
    pub fn update<T: HitTarget>(
        &mut self,
        dt: f32,
        collision: &dyn CollisionQuery,
        cell_size: f32,
        targets: &mut ObjectPool<T>,
    ) -> usize {
        if !self.is_active() {
            return 0;
        }
        match self.kind {
            ProjectileKind::Swipe => self.update_swipe(dt, targets),
            ProjectileKind::Orb => self.update_orb(dt, collision, cell_size, targets),
            ProjectileKind::BoneSpear => self.update_bone_spear(dt, targets),
        }
    }

    /// Draw data with `visual` as its image.
    #[must_use]
    pub fn sprite(&self, visual: VisualHandle) -> SpriteInstance {
        let flip = if self.transform.flip_y { -1.0 } else { 1.0 };
        SpriteInstance {
            position: self.transform.position.to_array(),
            scale: [1.0, flip],
            rotation: self.transform.rotation,
            visual,
            color: [1.0; 4],
        }
    }

    fn strike(&self) -> Strike {
        Strike {
            origin: self.transform.position,
            reach: self.launch.reach,
            attacker: self.launch.attacker,
            damage: self.launch.damage,
            knockback: self.launch.knockback,
        }
    }

    /// Strikes on the first tick, then lingers for its lifetime.
    fn update_swipe<T: HitTarget>(&mut self, dt: f32, targets: &mut ObjectPool<T>) -> usize {
        let mut hits = 0;
        if !self.struck {
            self.struck = true;
            self.timer = self.launch.lifetime;
            hits = resolve_hits(&self.strike(), targets);
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.finish();
        }
        hits
    }

    /// Flies until it hits something, enters a wall, or runs out of time.
    fn update_orb<T: HitTarget>(
        &mut self,
        dt: f32,
        collision: &dyn CollisionQuery,
        cell_size: f32,
        targets: &mut ObjectPool<T>,
    ) -> usize {
        self.transform.position += self.launch.velocity * dt;
        self.timer -= dt;

        let position = self.transform.position;
        if collision.has_collision(cell_of(position.x, cell_size), cell_of(position.y, cell_size)) {
            self.finish();
            return 0;
        }
        if resolve_first_hit(&self.strike(), targets).is_some() {
            self.struck = true;
            self.finish();
            return 1;
        }
        if self.timer <= 0.0 {
            self.finish();
        }
        0
    }

    /// Waits out the windup, strikes once, then lingers for its lifetime.
    fn update_bone_spear<T: HitTarget>(&mut self, dt: f32, targets: &mut ObjectPool<T>) -> usize {
        self.timer -= dt;
        if self.struck {
            if self.timer <= 0.0 {
                self.finish();
            }
            return 0;
        }
        if self.timer > 0.0 {
            return 0;
        }
        self.struck = true;
        self.timer = self.launch.lifetime;
        resolve_hits(&self.strike(), targets)
    }
}
