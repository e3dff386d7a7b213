//! Meat ball mob: sits for a moment after spawning, gets up, then waddles
//! straight at the hero.

use ossuary_shared::{angle_between, Vec2};
use rand::Rng;

use crate::actor::timers::{SIT, STAND};
use crate::actor::{Actor, ActorAction, Behavior};
use crate::config::MeatBallTuning;

/// A freshly spawned meat ball at `position`, already sitting.
pub fn spawn_meat_ball<R: Rng + ?Sized>(position: Vec2, tuning: &MeatBallTuning, rng: &mut R) -> Actor {
    let mut mob = Actor::new(position, tuning.radius, tuning.health, tuning.speed, Behavior::MeatBall);
    let sit = rng.gen_range(tuning.sit_min..=tuning.sit_max);
    mob.cooldowns.set_with(SIT, sit, ActorAction::StandUp);
    mob
}

impl Actor {
    /// Returns `true` while the mob is sitting or getting up.
    #[inline]
    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.cooldowns.has(SIT) || self.cooldowns.has(STAND)
    }

    /// Per-frame meat ball decisions: steer at `hero` unless resting.
    pub fn meat_ball_update(&mut self, hero: Vec2) {
        if self.is_resting() || !self.is_alive() {
            self.move_strength = Vec2::ZERO;
            return;
        }
        let heading = Vec2::from_angle(angle_between(self.position, hero));
        self.move_strength = heading;
        if heading.x != 0.0 {
            self.dir = if heading.x < 0.0 { -1 } else { 1 };
        }
    }

    /// Runs a meat ball action whose timer expired.
    pub fn meat_ball_dispatch(&mut self, action: ActorAction, stand_up_clip: f32) {
        if action == ActorAction::StandUp {
            self.cooldowns.set(STAND, stand_up_clip);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn tick(mob: &mut Actor, dt: f32) {
        mob.cooldowns.advance(dt);
        while let Some(expired) = mob.cooldowns.pop_expired() {
            mob.meat_ball_dispatch(expired.action, 0.5);
        }
    }

    #[test]
    fn test_sits_then_stands_then_chases() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut mob = spawn_meat_ball(Vec2::new(50.0, 50.0), &MeatBallTuning::default(), &mut rng);
        let sit = mob.cooldowns.remaining(SIT).unwrap();
        assert!((1.0..=2.0).contains(&sit));

        mob.meat_ball_update(Vec2::new(0.0, 50.0));
        assert_eq!(mob.move_strength, Vec2::ZERO);

        tick(&mut mob, sit);
        assert!(!mob.cooldowns.has(SIT));
        assert!(mob.cooldowns.has(STAND));
        mob.meat_ball_update(Vec2::new(0.0, 50.0));
        assert_eq!(mob.move_strength, Vec2::ZERO);

        tick(&mut mob, 0.51);
        mob.meat_ball_update(Vec2::new(0.0, 50.0));
        assert!((mob.move_strength.x + 1.0).abs() < 1e-6);
        assert_eq!(mob.dir, -1);
    }

    #[test]
    fn test_dead_mob_stops() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut mob = spawn_meat_ball(Vec2::ZERO, &MeatBallTuning::default(), &mut rng);
        mob.cooldowns.clear();
        mob.move_strength = Vec2::new(1.0, 0.0);
        mob.health = 0;

        mob.meat_ball_update(Vec2::new(10.0, 0.0));
        assert_eq!(mob.move_strength, Vec2::ZERO);
    }
}
