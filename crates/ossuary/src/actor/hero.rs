//! Hero behaviour.
//!
//! Every ability follows the same shape: bail out if its cooldown is armed
//! (or it is still locked), arm the cooldown, then act. The swipe acts late:
//! it arms a windup timer whose expiry places the slash.

use ossuary_core::{EffectKind, Effectible, ObjectPool, PoolHandle, Refresh};
use ossuary_shared::{angle_between, Vec2};
use rand::{Rng, RngCore};

use crate::actor::timers::{
    BONE_SPEAR_CD, DASH, DASH_CD, DIE, HAND_OF_DEATH_CD, HIT, SHOOT_CD, SWIPE_CD, SWIPE_DELAY,
};
use crate::actor::{Actor, ActorAction, Behavior};
use crate::assets::AssetTable;
use crate::combat::{Launch, ProjectileKind, Projectiles, Transform};
use crate::config::{HeroTuning, HeroUnlocks};
use crate::events::{Attack, EventSender, SimEvent};
use crate::level::LevelGrid;

/// Player intent for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeroInput {
    /// Walk direction, each axis in [-1, 1].
    pub movement: Vec2,
    /// Aim point in pixels.
    pub aim: Vec2,
    /// Swipe held.
    pub swing: bool,
    /// Orb volley held.
    pub shoot: bool,
    /// Dash pressed.
    pub dash: bool,
    /// Hand of death pressed.
    pub hand_of_death: bool,
    /// Bone spear pressed.
    pub bone_spear: bool,
}

/// Hero-only state carried in [`Behavior::Hero`].
#[derive(Clone, Debug, PartialEq)]
pub struct HeroState {
    /// Whether the hero accepts input at all.
    pub can_move: bool,
    /// Set once the hero landed dead and the death timer is armed.
    pub dying: bool,
    /// Last aim point in pixels.
    pub aim: Vec2,
    /// Souls collected.
    pub souls: u32,
    /// Levels gained.
    pub level: u32,
    /// Abilities available.
    pub unlocks: HeroUnlocks,
}

impl HeroState {
    /// Adds `amount` souls and returns how many levels that gained.
    ///
    /// `thresholds[n]` is the soul total needed for level `n + 1`.
    pub fn add_souls(&mut self, amount: u32, thresholds: &[u32]) -> u32 {
        self.souls = self.souls.saturating_add(amount);
        let mut gained = 0;
        while let Some(&needed) = thresholds.get(self.level as usize) {
            if self.souls < needed {
                break;
            }
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

/// What hero logic reaches into besides the hero itself.
pub struct HeroSystems<'a> {
    /// Hero tuning.
    pub tuning: &'a HeroTuning,
    /// Visual handles and clip timings.
    pub assets: &'a AssetTable,
    /// Level, for line-of-sight checks.
    pub level: &'a LevelGrid,
    /// Randomness for target picks.
    pub rng: &'a mut dyn RngCore,
    /// Notifications.
    pub events: &'a EventSender,
    /// Projectile pools.
    pub projectiles: &'a mut Projectiles,
    /// Mob pool.
    pub mobs: &'a mut ObjectPool<Actor>,
    /// Reusable handle buffer.
    pub scratch: &'a mut Vec<PoolHandle>,
}

/// A hero at `position` with full health.
///
/// A hero that cannot move is permanently invincible.
#[must_use]
pub fn spawn_hero(position: Vec2, tuning: &HeroTuning) -> Actor {
    let state = HeroState {
        can_move: tuning.can_move,
        dying: false,
        aim: position,
        souls: 0,
        level: 0,
        unlocks: tuning.unlocks,
    };
    let mut hero = Actor::new(position, tuning.radius, tuning.health, tuning.speed, Behavior::Hero(state));
    if !tuning.can_move {
        hero.add_effect(EffectKind::Invincible, f32::INFINITY);
    }
    hero
}

impl Actor {
    /// Per-frame hero decisions.
    pub fn hero_update(&mut self, input: &HeroInput, sys: &mut HeroSystems<'_>) {
        let Some(state) = self.hero_state_mut() else {
            return;
        };
        state.aim = input.aim;
        let (can_move, unlocks) = (state.can_move, state.unlocks);

        self.update_hit_flash();

        if self.cooldowns.has(DASH) || !can_move {
            return;
        }
        self.move_strength = Vec2::ZERO;
        if !self.is_alive() {
            return;
        }
        self.dir = if input.aim.x < self.position.x { -1 } else { 1 };

        if input.swing {
            self.attempt_swipe(sys);
        }
        if input.shoot && unlocks.shooting {
            self.attempt_orb(sys);
        }
        if !input.swing && !input.shoot && !self.has_effect(EffectKind::Stun) {
            self.move_strength = input.movement;
        }
        if input.dash && unlocks.dash {
            self.attempt_dash(sys);
        }
        if input.hand_of_death && unlocks.hand_of_death {
            self.attempt_hand_of_death(sys);
        }
        if input.bone_spear && unlocks.bone_spear {
            self.attempt_bone_spear(sys);
        }
    }

    /// Runs a hero action whose timer expired.
    pub fn hero_dispatch(&mut self, action: ActorAction, sys: &mut HeroSystems<'_>) {
        match action {
            ActorAction::SpawnSwipe => self.spawn_swipe(sys),
            ActorAction::EndDash => self.speed_multiplier = 1.0,
            ActorAction::Die => {
                tracing::info!(x = self.position.x, y = self.position.y, "hero died");
                sys.events.send(SimEvent::HeroDied {
                    position: self.position,
                });
            }
            ActorAction::StandUp => {}
        }
    }

    /// Takes a hit pushing along `angle`.
    ///
    /// Ignored while invincible or dead. Returns `true` if the hit landed.
    pub fn hero_hit(&mut self, angle: f32, tuning: &HeroTuning, events: &EventSender) -> bool {
        if self.has_effect(EffectKind::Invincible) || !self.is_alive() {
            return false;
        }
        self.health -= 1;
        self.add_effect(EffectKind::Invincible, tuning.hit_invincibility);
        self.velocity += Vec2::from_angle(angle) * tuning.hit_knockback;
        self.velocity_z += tuning.hit_hop;
        self.tint.r = 1.0;
        self.tint.g = 0.0;
        self.tint.b = 0.0;
        self.cooldowns.set(HIT, tuning.hit_flash);

        events.send(SimEvent::HeroHit {
            health_remaining: self.health,
            angle,
        });
        if self.is_alive() {
            tracing::debug!(health = self.health, "hero hit");
        } else {
            tracing::info!("hero down");
        }
        true
    }

    /// Called on the fixed step the hero lands from a hop.
    pub fn hero_on_land(&mut self, tuning: &HeroTuning) {
        if self.is_alive() {
            return;
        }
        let Some(state) = self.hero_state_mut() else {
            return;
        };
        if state.dying {
            return;
        }
        state.dying = true;
        self.velocity_z = 0.0;
        self.cooldowns.set_with(DIE, tuning.death_delay, ActorAction::Die);
    }

    fn update_hit_flash(&mut self) {
        let fade = self.cooldowns.ratio(HIT).unwrap_or(1.0);
        self.tint.r = 1.0;
        self.tint.g = fade;
        self.tint.b = fade;
    }

    fn aim_angle(&self) -> f32 {
        let aim = self.hero_state().map_or(self.position, |state| state.aim);
        angle_between(self.position, aim)
    }

    fn fired(&self, attack: Attack, sys: &HeroSystems<'_>) {
        tracing::debug!(?attack, x = self.position.x, y = self.position.y, "attack fired");
        sys.events.send(SimEvent::AttackFired {
            attack,
            position: self.position,
        });
    }

    fn attempt_swipe(&mut self, sys: &mut HeroSystems<'_>) {
        if self.cooldowns.has(SWIPE_CD) {
            return;
        }
        let t = sys.tuning;
        self.cooldowns.set(SWIPE_CD, t.swipe_cooldown);
        self.cooldowns.set_with(SWIPE_DELAY, t.swipe_windup, ActorAction::SpawnSwipe);
        self.add_effect(EffectKind::Stun, t.swipe_stun);
        self.fired(Attack::Swipe, sys);
    }

    fn spawn_swipe(&mut self, sys: &mut HeroSystems<'_>) {
        let t = sys.tuning;
        let angle = self.aim_angle();
        let launch = Launch {
            transform: Transform {
                position: self.position + Vec2::from_angle(angle) * t.swipe_offset,
                rotation: angle,
                flip_y: self.dir == -1,
            },
            attacker: self.position,
            reach: t.swipe_reach,
            damage: t.damage,
            knockback: t.swipe_knockback,
            lifetime: sys.assets.swipe_clip,
            ..Launch::default()
        };
        sys.projectiles.spawn(ProjectileKind::Swipe, &launch, sys.events);
    }

    fn attempt_orb(&mut self, sys: &mut HeroSystems<'_>) {
        if self.cooldowns.has(SHOOT_CD) {
            return;
        }
        let t = sys.tuning;
        self.cooldowns.set(SHOOT_CD, t.orb_cooldown);

        let straight = self.aim_angle();
        let spread = t.orb_spread_degrees.to_radians();
        for angle in [straight, straight + spread, straight - spread] {
            let heading = Vec2::from_angle(angle);
            let launch = Launch {
                transform: Transform {
                    position: self.position + heading * t.orb_offset,
                    rotation: angle,
                    flip_y: false,
                },
                attacker: self.position,
                velocity: heading * t.orb_speed,
                reach: t.orb_radius,
                damage: t.damage,
                knockback: t.orb_knockback,
                lifetime: t.orb_lifetime,
                windup: 0.0,
            };
            sys.projectiles.spawn(ProjectileKind::Orb, &launch, sys.events);
        }
        self.fired(Attack::Orb, sys);
    }

    fn attempt_dash(&mut self, sys: &mut HeroSystems<'_>) {
        if self.cooldowns.has(DASH_CD) || self.cooldowns.has(DASH) {
            return;
        }
        let t = sys.tuning;
        self.move_strength = Vec2::from_angle(self.aim_angle());
        self.speed_multiplier = t.dash_speed_multiplier;
        self.cooldowns.set(DASH_CD, t.dash_cooldown);
        // A dash must not cut short a longer invincibility from a hit
        self.add_effect_with(EffectKind::Invincible, t.dash_invincibility, Refresh::Max);
        self.cooldowns.set_with(DASH, t.dash_duration, ActorAction::EndDash);
        self.fired(Attack::Dash, sys);
    }

    fn attempt_hand_of_death(&mut self, sys: &mut HeroSystems<'_>) {
        if self.cooldowns.has(HAND_OF_DEATH_CD) {
            return;
        }
        self.cooldowns.set(HAND_OF_DEATH_CD, sys.tuning.hand_of_death_cooldown);

        sys.scratch.clear();
        let mobs = &*sys.mobs;
        sys.scratch
            .extend(mobs.handles().filter(|&handle| mobs.get(handle).is_some_and(Actor::is_alive)));
        let picks = sys.tuning.hand_of_death_targets.min(sys.scratch.len());
        for i in 0..picks {
            let j = sys.rng.gen_range(i..sys.scratch.len());
            sys.scratch.swap(i, j);
        }
        for &handle in &sys.scratch[..picks] {
            if let Some(mob) = sys.mobs.get_mut(handle) {
                mob.health = 0;
            }
        }
        tracing::debug!(killed = picks, "hand of death");
        self.fired(Attack::HandOfDeath, sys);
    }

    fn attempt_bone_spear(&mut self, sys: &mut HeroSystems<'_>) {
        if self.cooldowns.has(BONE_SPEAR_CD) {
            return;
        }
        let aim = self.hero_state().map_or(self.position, |state| state.aim);
        let from = sys.level.cell_at(self.position);
        let to = sys.level.cell_at(aim);
        if !sys.level.has_line_of_sight(from, to) {
            return;
        }
        let t = sys.tuning;
        self.cooldowns.set(BONE_SPEAR_CD, t.bone_spear_cooldown);
        let launch = Launch {
            transform: Transform {
                position: aim,
                ..Transform::default()
            },
            attacker: self.position,
            reach: t.bone_spear_reach,
            damage: t.damage,
            knockback: t.bone_spear_knockback,
            lifetime: t.bone_spear_duration,
            windup: t.bone_spear_windup,
            ..Launch::default()
        };
        sys.projectiles.spawn(ProjectileKind::BoneSpear, &launch, sys.events);
        self.fired(Attack::BoneSpear, sys);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::actor::spawn_meat_ball;
    use crate::config::{MeatBallTuning, PoolSizes, SpawnPolicy};
    use crate::events::{EventBus, EventReceiver};

    struct Rig {
        tuning: HeroTuning,
        assets: AssetTable,
        level: LevelGrid,
        rng: ChaCha8Rng,
        events: EventSender,
        receiver: EventReceiver,
        projectiles: Projectiles,
        mobs: ObjectPool<Actor>,
        scratch: Vec<PoolHandle>,
    }

    impl Rig {
        fn new() -> Self {
            let (events, receiver) = EventBus::create_pair(64);
            let tuning = HeroTuning {
                unlocks: HeroUnlocks::all(),
                ..HeroTuning::default()
            };
            Self {
                tuning,
                assets: AssetTable::default(),
                level: LevelGrid::new(32, 32, 16.0),
                rng: ChaCha8Rng::seed_from_u64(7),
                events,
                receiver,
                projectiles: Projectiles::new(&PoolSizes::default(), SpawnPolicy::Skip),
                mobs: ObjectPool::new(8, |_| Actor::new(Vec2::ZERO, 7.0, 0, 0.0, Behavior::MeatBall)),
                scratch: Vec::with_capacity(8),
            }
        }

        fn sys(&mut self) -> HeroSystems<'_> {
            HeroSystems {
                tuning: &self.tuning,
                assets: &self.assets,
                level: &self.level,
                rng: &mut self.rng,
                events: &self.events,
                projectiles: &mut self.projectiles,
                mobs: &mut self.mobs,
                scratch: &mut self.scratch,
            }
        }

        fn add_mob(&mut self, x: f32) {
            let handle = self.mobs.alloc().unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            *self.mobs.get_mut(handle).unwrap() =
                spawn_meat_ball(Vec2::new(x, 100.0), &MeatBallTuning::default(), &mut rng);
        }

        /// Advances the hero's timers, dispatching what expired.
        fn tick(&mut self, hero: &mut Actor, dt: f32) {
            hero.cooldowns.advance(dt);
            while let Some(expired) = hero.cooldowns.pop_expired() {
                hero.hero_dispatch(expired.action, &mut self.sys());
            }
            hero.update_effects(dt);
        }
    }

    fn hero() -> Actor {
        let tuning = HeroTuning {
            unlocks: HeroUnlocks::all(),
            ..HeroTuning::default()
        };
        spawn_hero(Vec2::new(100.0, 100.0), &tuning)
    }

    fn aim_right() -> HeroInput {
        HeroInput {
            aim: Vec2::new(200.0, 100.0),
            ..HeroInput::default()
        }
    }

    #[test]
    fn test_swipe_spawns_after_windup() {
        let mut rig = Rig::new();
        let mut hero = hero();
        let input = HeroInput {
            swing: true,
            ..aim_right()
        };

        hero.hero_update(&input, &mut rig.sys());
        assert!(hero.cooldowns.has(SWIPE_CD));
        assert!(hero.has_effect(EffectKind::Stun));
        assert_eq!(rig.projectiles.live_count(), 0);

        // Held swing does not re-trigger while the cooldown runs
        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(rig.receiver.drain().len(), 1);

        rig.tick(&mut hero, 0.21);
        assert_eq!(rig.projectiles.live_count_of(ProjectileKind::Swipe), 1);
        let (_, swipe) = rig.projectiles.iter().next().unwrap();
        assert!((swipe.transform().position.x - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_stun_blocks_movement() {
        let mut rig = Rig::new();
        let mut hero = hero();
        hero.add_effect(EffectKind::Stun, 0.3);

        let input = HeroInput {
            movement: Vec2::new(1.0, 0.0),
            ..aim_right()
        };
        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(hero.move_strength, Vec2::ZERO);

        rig.tick(&mut hero, 0.3);
        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(hero.move_strength, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_orb_volley_fires_three() {
        let mut rig = Rig::new();
        let mut hero = hero();
        let input = HeroInput {
            shoot: true,
            ..aim_right()
        };

        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(rig.projectiles.live_count_of(ProjectileKind::Orb), 3);
        assert!(hero.cooldowns.has(SHOOT_CD));
    }

    #[test]
    fn test_locked_abilities_do_nothing() {
        let mut rig = Rig::new();
        let mut hero = spawn_hero(Vec2::new(100.0, 100.0), &HeroTuning::default());
        let input = HeroInput {
            shoot: true,
            dash: true,
            bone_spear: true,
            hand_of_death: true,
            ..aim_right()
        };

        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(rig.projectiles.live_count(), 0);
        assert!(hero.cooldowns.is_empty());
        assert!(!rig.receiver.has_events());
    }

    #[test]
    fn test_dash_boosts_then_ends() {
        let mut rig = Rig::new();
        let mut hero = hero();
        let input = HeroInput {
            dash: true,
            ..aim_right()
        };

        hero.hero_update(&input, &mut rig.sys());
        assert_eq!(hero.speed_multiplier, 5.0);
        assert_eq!(hero.move_strength, Vec2::new(1.0, 0.0));
        assert!(hero.has_effect(EffectKind::Invincible));
        assert_eq!(hero.tint.a, 0.5);

        // Input is ignored mid-dash
        hero.hero_update(&HeroInput::default(), &mut rig.sys());
        assert_eq!(hero.move_strength, Vec2::new(1.0, 0.0));

        rig.tick(&mut hero, 0.26);
        assert_eq!(hero.speed_multiplier, 1.0);
        rig.tick(&mut hero, 0.1);
        assert!(!hero.has_effect(EffectKind::Invincible));
        assert_eq!(hero.tint.a, 1.0);
    }

    #[test]
    fn test_dash_keeps_longer_invincibility() {
        let mut rig = Rig::new();
        let mut hero = hero();
        hero.add_effect(EffectKind::Invincible, 2.0);

        hero.hero_update(&HeroInput { dash: true, ..aim_right() }, &mut rig.sys());
        assert_eq!(hero.effects().remaining(EffectKind::Invincible), Some(2.0));
    }

    #[test]
    fn test_hand_of_death_kills_distinct_mobs() {
        let mut rig = Rig::new();
        for i in 0..7 {
            rig.add_mob(20.0 * i as f32);
        }
        let mut hero = hero();

        hero.hero_update(&HeroInput { hand_of_death: true, ..aim_right() }, &mut rig.sys());

        let dead = rig.mobs.iter().filter(|(_, mob)| !mob.is_alive()).count();
        assert_eq!(dead, 5);
    }

    #[test]
    fn test_hand_of_death_with_few_mobs() {
        let mut rig = Rig::new();
        rig.add_mob(10.0);
        rig.add_mob(30.0);
        let mut hero = hero();

        hero.hero_update(&HeroInput { hand_of_death: true, ..aim_right() }, &mut rig.sys());

        assert!(rig.mobs.iter().all(|(_, mob)| !mob.is_alive()));
        assert!(hero.cooldowns.has(HAND_OF_DEATH_CD));
    }

    #[test]
    fn test_bone_spear_needs_line_of_sight() {
        let mut rig = Rig::new();
        for cy in 0..32 {
            rig.level.set_solid(9, cy, true);
        }
        let mut hero = hero();

        // Wall at x = 144..160 between hero and aim
        hero.hero_update(&HeroInput { bone_spear: true, ..aim_right() }, &mut rig.sys());
        assert!(!hero.cooldowns.has(BONE_SPEAR_CD));
        assert_eq!(rig.projectiles.live_count(), 0);

        let clear = HeroInput {
            bone_spear: true,
            aim: Vec2::new(130.0, 100.0),
            ..HeroInput::default()
        };
        hero.hero_update(&clear, &mut rig.sys());
        assert!(hero.cooldowns.has(BONE_SPEAR_CD));
        assert_eq!(rig.projectiles.live_count_of(ProjectileKind::BoneSpear), 1);
    }

    #[test]
    fn test_hit_then_invincible() {
        let rig = Rig::new();
        let mut hero = hero();

        assert!(hero.hero_hit(0.0, &rig.tuning, &rig.events));
        assert_eq!(hero.health, 3);
        assert!(hero.has_effect(EffectKind::Invincible));
        assert_eq!(hero.tint.g, 0.0);
        assert!(hero.velocity.x > 0.0);
        assert!(hero.velocity_z > 0.0);

        assert!(!hero.hero_hit(0.0, &rig.tuning, &rig.events));
        assert_eq!(hero.health, 3);
        assert_eq!(
            rig.receiver.drain(),
            vec![SimEvent::HeroHit {
                health_remaining: 3,
                angle: 0.0
            }]
        );
    }

    #[test]
    fn test_hit_flash_fades() {
        let mut rig = Rig::new();
        let mut hero = hero();
        hero.hero_hit(0.0, &rig.tuning, &rig.events);

        rig.tick(&mut hero, 0.125);
        hero.hero_update(&aim_right(), &mut rig.sys());
        assert!((hero.tint.g - 0.5).abs() < 1e-4);

        rig.tick(&mut hero, 0.2);
        hero.hero_update(&aim_right(), &mut rig.sys());
        assert_eq!(hero.tint.g, 1.0);
    }

    #[test]
    fn test_landing_dead_arms_death() {
        let mut rig = Rig::new();
        let mut hero = hero();
        hero.health = 1;
        hero.hero_hit(0.0, &rig.tuning, &rig.events);
        assert!(!hero.is_alive());

        hero.hero_on_land(&rig.tuning);
        hero.hero_on_land(&rig.tuning);
        assert!(hero.hero_state().unwrap().dying);
        assert!(hero.cooldowns.has(DIE));

        rig.receiver.drain();
        rig.tick(&mut hero, 1.0);
        assert_eq!(
            rig.receiver.drain(),
            vec![SimEvent::HeroDied {
                position: hero.position
            }]
        );
    }

    #[test]
    fn test_immobile_hero_is_always_invincible() {
        let rig = Rig::new();
        let tuning = HeroTuning {
            can_move: false,
            ..HeroTuning::default()
        };
        let mut hero = spawn_hero(Vec2::ZERO, &tuning);
        hero.update_effects(1000.0);

        assert!(hero.has_effect(EffectKind::Invincible));
        assert!(!hero.hero_hit(0.0, &rig.tuning, &rig.events));
    }

    #[test]
    fn test_souls_cross_thresholds() {
        let mut state = hero().hero_state().unwrap().clone();
        let thresholds = [5, 15, 30];

        assert_eq!(state.add_souls(4, &thresholds), 0);
        assert_eq!(state.add_souls(1, &thresholds), 1);
        assert_eq!(state.add_souls(30, &thresholds), 2);
        assert_eq!(state.level, 3);
        assert_eq!(state.add_souls(100, &thresholds), 0);
    }
}
