//! # World Loop
//!
//! One call to [`World::update`] is one rendered frame:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. TIMERS      hero then mobs; expired actions dispatched    │
//! │ 2. EFFECTS     decay; ended effects removed after the pass   │
//! │ 3. DECISIONS   hero abilities (may spawn), mob steering      │
//! │ 4. FIXED STEPS zero or more, capped by max_substeps          │
//! │ 5. CONTACTS    mob bodies touching the hero                  │
//! │ 6. PROJECTILES advance, strike, free the finished ones       │
//! │ 7. DEATHS      explode, notify, collect souls, free slots    │
//! │ 8. FX          particle physics against the level grid       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything random in a frame draws from the context RNG in this order,
//! so equal seeds and inputs give equal runs.

use ossuary_core::{lifecycle_violation, Effectible, ObjectPool, PoolHandle};
use ossuary_shared::{angle_between, Vec2};

use crate::actor::{spawn_hero, spawn_meat_ball, Actor, Behavior, HeroInput, HeroSystems};
use crate::assets::AssetTable;
use crate::combat::Projectiles;
use crate::config::{ConfigError, ConfigResult, SimConfig};
use crate::context::SimContext;
use crate::events::{EventSender, SimEvent};
use crate::fx::{DrawSink, Fx, PhysicsEnv};
use crate::level::LevelGrid;

/// Dust thrown up when the hero lands from a hop.
const LANDING_DUST: usize = 6;

/// How long the shadow under a knocked-up hero lasts.
const HOP_SHADOW: f32 = 0.5;

/// Counters kept across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames simulated.
    pub ticks: u64,
    /// Fixed steps simulated in total.
    pub fixed_steps: u64,
    /// Fixed steps run by the last frame.
    pub substeps: u32,
    /// Mobs killed in total.
    pub kills: u64,
    /// Live particles after the last frame.
    pub live_particles: usize,
    /// Live projectiles after the last frame.
    pub live_projectiles: usize,
    /// Live mobs after the last frame.
    pub live_mobs: usize,
}

/// The whole simulation: context, hero, mobs, projectiles and fx.
pub struct World {
    ctx: SimContext,
    fx: Fx,
    projectiles: Projectiles,
    hero: Actor,
    mobs: ObjectPool<Actor>,
    /// Unsimulated time, always below one fixed step after a frame.
    accumulator: f32,
    stats: FrameStats,
    /// Handle buffer reused by hand of death and the death pass.
    scratch: Vec<PoolHandle>,
    input: HeroInput,
    fx_time_scale: Option<f32>,
}

impl World {
    /// Builds a world with the hero standing in the middle of `level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation or the
    /// level's cell size differs from `config.grid_cell_size`.
    pub fn new(config: SimConfig, level: LevelGrid, assets: AssetTable, events: EventSender) -> ConfigResult<Self> {
        config.validate()?;
        if (level.cell_size() - config.grid_cell_size).abs() > f32::EPSILON {
            return Err(ConfigError::Invalid(format!(
                "level cell size {} differs from grid_cell_size {}",
                level.cell_size(),
                config.grid_cell_size
            )));
        }

        let start = level.cell_center(level.width() / 2, level.height() / 2);
        let hero = spawn_hero(start, &config.hero);
        let mobs = ObjectPool::new(config.mob_capacity, |_| {
            Actor::new(Vec2::ZERO, 0.0, 0, 0.0, Behavior::MeatBall)
        });
        let projectiles = Projectiles::new(&config.pools, config.spawn_policy);
        let fx = Fx::new(config.particle_capacity);

        tracing::info!(
            seed = config.seed,
            particles = config.particle_capacity,
            mobs = config.mob_capacity,
            width = level.width(),
            height = level.height(),
            "world created"
        );

        Ok(Self {
            scratch: Vec::with_capacity(config.mob_capacity),
            ctx: SimContext::new(config, level, assets, events),
            fx,
            projectiles,
            hero,
            mobs,
            accumulator: 0.0,
            stats: FrameStats::default(),
            input: HeroInput::default(),
            fx_time_scale: None,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Shared state.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// The hero.
    #[inline]
    #[must_use]
    pub fn hero(&self) -> &Actor {
        &self.hero
    }

    /// The hero, mutably.
    #[inline]
    pub fn hero_mut(&mut self) -> &mut Actor {
        &mut self.hero
    }

    /// The mob pool.
    #[inline]
    #[must_use]
    pub fn mobs(&self) -> &ObjectPool<Actor> {
        &self.mobs
    }

    /// The projectile pools.
    #[inline]
    #[must_use]
    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    /// The effect system.
    #[inline]
    #[must_use]
    pub fn fx(&self) -> &Fx {
        &self.fx
    }

    /// Counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Replaces the input used by the next frames.
    #[inline]
    pub fn set_input(&mut self, input: HeroInput) {
        self.input = input;
    }

    /// Slows or speeds up particles only. `None` runs them in real time.
    #[inline]
    pub fn set_fx_time_scale(&mut self, scale: Option<f32>) {
        self.fx_time_scale = scale;
    }

    /// Places a sitting meat ball at `position`.
    ///
    /// Returns `None` when every mob slot is taken.
    pub fn spawn_meat_ball(&mut self, position: Vec2) -> Option<PoolHandle> {
        let handle = match self.mobs.alloc() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::debug!(error = %err, "meat ball spawn skipped");
                return None;
            }
        };
        let mob = spawn_meat_ball(position, &self.ctx.config.meat_ball, &mut self.ctx.rng);
        *self.mobs.get_mut(handle)? = mob;
        tracing::debug!(slot = handle.index(), x = position.x, y = position.y, "meat ball spawned");
        Some(handle)
    }

    // ========================================================================
    // FRAME
    // ========================================================================

    /// Simulates one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let max = self.ctx.config.max_frame_delta;
        let dt = if dt > max {
            tracing::warn!(dt, max, "frame delta clamped");
            max
        } else {
            dt.max(0.0)
        };
        self.stats.ticks += 1;

        self.run_timers(dt);

        self.hero.update_effects(dt);
        for (_, mob) in self.mobs.iter_mut() {
            mob.update_effects(dt);
        }

        self.decide();

        self.accumulator += dt;
        let step = self.ctx.config.fixed_timestep;
        let mut substeps = 0;
        while self.accumulator >= step && substeps < self.ctx.config.max_substeps {
            self.fixed_update();
            self.accumulator -= step;
            substeps += 1;
        }
        if self.accumulator >= step {
            tracing::debug!(dropped = self.accumulator, "fixed step backlog dropped");
            self.accumulator = 0.0;
        }
        self.stats.substeps = substeps;
        self.stats.fixed_steps += u64::from(substeps);

        self.resolve_contacts();

        let cell_size = self.ctx.cell_size();
        self.projectiles.update(dt, &self.ctx.level, cell_size, &mut self.mobs);

        self.reap_dead_mobs();

        let mut env = PhysicsEnv {
            collision: &self.ctx.level,
            cell_size,
            rng: &mut self.ctx.rng,
        };
        self.fx.update(dt, self.fx_time_scale, &mut env);

        self.stats.live_particles = self.fx.live_count();
        self.stats.live_projectiles = self.projectiles.live_count();
        self.stats.live_mobs = self.mobs.live_count();
    }

    /// One fixed physics step for every actor.
    pub fn fixed_update(&mut self) {
        let level = &self.ctx.level;
        let cell_size = level.cell_size();
        let friction = self.ctx.config.actor_friction;
        let gravity = self.ctx.config.gravity_z;

        if self.hero.fixed_update(level, cell_size, friction, gravity) {
            self.hero.hero_on_land(&self.ctx.config.hero);
            let at = self.hero.position;
            self.fx
                .dirt_debris(&self.ctx.assets, &mut self.ctx.rng, at.x, at.y + self.hero.radius, LANDING_DUST);
        }
        for (_, mob) in self.mobs.iter_mut() {
            mob.fixed_update(level, cell_size, friction, gravity);
        }
    }

    /// Submits particles, then projectiles, to `sink`.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        self.fx.draw(sink);
        self.projectiles.draw(&self.ctx.assets, sink);
    }

    fn run_timers(&mut self, dt: f32) {
        let mut sys = hero_systems(&mut self.ctx, &mut self.projectiles, &mut self.mobs, &mut self.scratch);
        self.hero.cooldowns.advance(dt);
        while let Some(expired) = self.hero.cooldowns.pop_expired() {
            self.hero.hero_dispatch(expired.action, &mut sys);
        }

        let stand_up = self.ctx.assets.meat_ball_stand_up_clip;
        for (_, mob) in self.mobs.iter_mut() {
            mob.cooldowns.advance(dt);
            while let Some(expired) = mob.cooldowns.pop_expired() {
                mob.meat_ball_dispatch(expired.action, stand_up);
            }
        }
    }

    fn decide(&mut self) {
        let input = self.input;
        let mut sys = hero_systems(&mut self.ctx, &mut self.projectiles, &mut self.mobs, &mut self.scratch);
        self.hero.hero_update(&input, &mut sys);

        let target = self.hero.position;
        for (_, mob) in self.mobs.iter_mut() {
            mob.meat_ball_update(target);
        }
    }

    fn resolve_contacts(&mut self) {
        for (_, mob) in self.mobs.iter() {
            if !mob.is_alive() {
                continue;
            }
            let reach = mob.radius + self.hero.radius;
            if self.hero.position.distance_squared(mob.position) > reach * reach {
                continue;
            }
            let angle = angle_between(mob.position, self.hero.position);
            if self.hero.hero_hit(angle, &self.ctx.config.hero, &self.ctx.events) {
                let at = self.hero.position;
                self.fx
                    .shadow_small(&self.ctx.assets, at.x, at.y + self.hero.radius, HOP_SHADOW);
            }
        }
    }

    fn reap_dead_mobs(&mut self) {
        self.scratch.clear();
        for (handle, mob) in self.mobs.iter() {
            if mob.is_alive() {
                continue;
            }
            let at = mob.position;
            self.fx.meat_ball_explode(&self.ctx.assets, &mut self.ctx.rng, at.x, at.y);
            self.ctx.events.send(SimEvent::MobKilled {
                slot: handle.index(),
                position: at,
            });
            self.scratch.push(handle);
        }

        let kills = self.scratch.len();
        for handle in self.scratch.drain(..) {
            if let Err(err) = self.mobs.free(handle) {
                lifecycle_violation(&err);
            }
        }
        if kills == 0 {
            return;
        }
        self.stats.kills += kills as u64;
        tracing::debug!(kills, "mobs killed");
        self.collect_souls(kills);
    }

    fn collect_souls(&mut self, kills: usize) {
        let souls = &self.ctx.config.souls;
        let amount = souls.per_kill.saturating_mul(u32::try_from(kills).unwrap_or(u32::MAX));
        let Some(state) = self.hero.hero_state_mut() else {
            return;
        };
        let gained = state.add_souls(amount, &souls.level_thresholds);
        let (level, total) = (state.level, state.souls);
        if gained == 0 {
            return;
        }

        for reached in (level - gained + 1)..=level {
            tracing::info!(level = reached, souls = total, "hero levelled up");
            self.ctx.events.send(SimEvent::LevelUp {
                level: reached,
                souls: total,
            });
            let at = self.hero.position;
            self.fx.level_up(&self.ctx.assets, &mut self.ctx.rng, at.x, at.y);
        }
    }
}

/// Lends the hero what it reaches into, split from the world's fields.
fn hero_systems<'a>(
    ctx: &'a mut SimContext,
    projectiles: &'a mut Projectiles,
    mobs: &'a mut ObjectPool<Actor>,
    scratch: &'a mut Vec<PoolHandle>,
) -> HeroSystems<'a> {
    HeroSystems {
        tuning: &ctx.config.hero,
        assets: &ctx.assets,
        level: &ctx.level,
        rng: &mut ctx.rng,
        events: &ctx.events,
        projectiles,
        mobs,
        scratch,
    }
}
