//! # Actors
//!
//! One record for everything that walks: transform, health, cooldowns and
//! effects. What differs between the hero and a mob lives in [`Behavior`]
//! and is dispatched with an explicit `match`.
//!
//! Units: `position` is pixels; `velocity` and `move_strength` are cells per
//! fixed tick; `z` is a hop height in cells, up positive.

mod hero;
mod meat_ball;

pub use hero::{spawn_hero, HeroInput, HeroState, HeroSystems};
pub use meat_ball::spawn_meat_ball;

use ossuary_core::{Cooldowns, EffectKind, Effectible, Effects};
use ossuary_shared::Vec2;

use crate::combat::HitTarget;
use crate::fx::Color;
use crate::level::{cell_of, CollisionQuery};

// ============================================================================
// TIMER NAMES
// ============================================================================

/// Cooldown names shared by the actor behaviours.
pub mod timers {
    use ossuary_core::TimerName;

    /// Gates the swipe.
    pub const SWIPE_CD: TimerName = "swipeCD";
    /// Swipe windup; spawns the slash on expiry.
    pub const SWIPE_DELAY: TimerName = "delay";
    /// Gates the orb volley.
    pub const SHOOT_CD: TimerName = "shootCD";
    /// Gates the dash.
    pub const DASH_CD: TimerName = "dashCD";
    /// Dash in progress.
    pub const DASH: TimerName = "dash";
    /// Gates hand of death.
    pub const HAND_OF_DEATH_CD: TimerName = "handOfDeathCD";
    /// Gates the bone spear.
    pub const BONE_SPEAR_CD: TimerName = "boneSpearCD";
    /// Red flash after the hero is hit.
    pub const HIT: TimerName = "hit";
    /// Death animation; the run ends on expiry.
    pub const DIE: TimerName = "die";
    /// Meat ball sitting after spawn.
    pub const SIT: TimerName = "sit";
    /// Meat ball getting up.
    pub const STAND: TimerName = "stand";
}

// ============================================================================
// ACTOR
// ============================================================================

/// Deferred work armed on an actor's cooldowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorAction {
    /// The swipe windup ended; place the slash.
    SpawnSwipe,
    /// The dash ended; drop back to walking speed.
    EndDash,
    /// The death animation ended.
    Die,
    /// A meat ball finished sitting and starts getting up.
    StandUp,
}

/// What kind of actor this is, with its kind-specific state.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// The player character.
    Hero(HeroState),
    /// A mob that waddles toward the hero.
    MeatBall,
}

/// An entity that moves on the level grid.
#[derive(Clone, Debug)]
pub struct Actor {
    /// Centre in pixels.
    pub position: Vec2,
    /// Cells per fixed tick.
    pub velocity: Vec2,
    /// Hop height.
    pub z: f32,
    /// Hop speed, up positive.
    pub velocity_z: f32,
    /// Body radius in pixels.
    pub radius: f32,
    /// Hit points. Zero or less is dead.
    pub health: i32,
    /// Facing: -1 left, 1 right.
    pub dir: i32,
    /// Acceleration per fixed tick at full strength.
    pub speed: f32,
    /// Temporary speed boost.
    pub speed_multiplier: f32,
    /// Steering input, each axis in [-1, 1].
    pub move_strength: Vec2,
    /// Named timers.
    pub cooldowns: Cooldowns<ActorAction>,
    /// Tint handed to the renderer.
    pub tint: Color,
    /// Kind-specific state.
    pub behavior: Behavior,
    effects: Effects,
}

impl Actor {
    /// An actor standing still at `position`.
    #[must_use]
    pub fn new(position: Vec2, radius: f32, health: i32, speed: f32, behavior: Behavior) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            z: 0.0,
            velocity_z: 0.0,
            radius,
            health,
            dir: 1,
            speed,
            speed_multiplier: 1.0,
            move_strength: Vec2::ZERO,
            cooldowns: Cooldowns::new(),
            tint: Color::WHITE,
            behavior,
            effects: Effects::new(),
        }
    }

    /// Returns `true` while health is above zero.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Returns `true` for the hero.
    #[inline]
    #[must_use]
    pub fn is_hero(&self) -> bool {
        matches!(self.behavior, Behavior::Hero(_))
    }

    /// Hero state, if this is the hero.
    #[must_use]
    pub fn hero_state(&self) -> Option<&HeroState> {
        match &self.behavior {
            Behavior::Hero(state) => Some(state),
            Behavior::MeatBall => None,
        }
    }

    /// Hero state, mutably.
    pub fn hero_state_mut(&mut self) -> Option<&mut HeroState> {
        match &mut self.behavior {
            Behavior::Hero(state) => Some(state),
            Behavior::MeatBall => None,
        }
    }

    /// One fixed physics step: steering, grid-collided movement, friction
    /// and the hop.
    ///
    /// Returns `true` on the step the actor lands from a hop.
    pub fn fixed_update(&mut self, level: &dyn CollisionQuery, cell_size: f32, friction: f32, gravity_z: f32) -> bool {
        self.velocity += self.move_strength * (self.speed * self.speed_multiplier);
        self.move_with_collision(level, cell_size);
        self.velocity *= friction;
        self.update_hop(gravity_z)
    }

    /// Moves one axis at a time so a wall on one axis still lets the actor
    /// slide along the other.
    fn move_with_collision(&mut self, level: &dyn CollisionQuery, cell_size: f32) {
        let step = self.velocity * cell_size;

        if step.x != 0.0 {
            let x = self.position.x + step.x;
            let edge = x + self.radius * step.x.signum();
            if level.has_collision(cell_of(edge, cell_size), cell_of(self.position.y, cell_size)) {
                self.velocity.x = 0.0;
            } else {
                self.position.x = x;
            }
        }

        if step.y != 0.0 {
            let y = self.position.y + step.y;
            let edge = y + self.radius * step.y.signum();
            if level.has_collision(cell_of(self.position.x, cell_size), cell_of(edge, cell_size)) {
                self.velocity.y = 0.0;
            } else {
                self.position.y = y;
            }
        }
    }

    fn update_hop(&mut self, gravity_z: f32) -> bool {
        if self.z <= 0.0 && self.velocity_z == 0.0 {
            return false;
        }
        self.z += self.velocity_z;
        self.velocity_z -= gravity_z;
        if self.z <= 0.0 && self.velocity_z < 0.0 {
            self.z = 0.0;
            self.velocity_z = 0.0;
            return true;
        }
        false
    }
}

impl Effectible for Actor {
    fn effects(&self) -> &Effects {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    fn is_effectible(&self) -> bool {
        self.is_alive()
    }

    fn on_effect_start(&mut self, kind: EffectKind) {
        if kind == EffectKind::Invincible && self.is_hero() {
            self.tint.a = 0.5;
        }
    }

    fn on_effect_end(&mut self, kind: EffectKind) {
        if kind == EffectKind::Invincible && self.is_hero() {
            self.tint.a = 1.0;
        }
    }
}

impl HitTarget for Actor {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_hittable(&self) -> bool {
        self.is_alive()
    }

    fn take_hit(&mut self, damage: i32, angle: f32) {
        self.health = self.health.saturating_sub(damage);
        self.dir = if angle.cos() < 0.0 { 1 } else { -1 };
    }

    fn push(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }
}
