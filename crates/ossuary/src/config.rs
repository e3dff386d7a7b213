//! # Simulation Configuration
//!
//! Tuning is loaded once at startup from TOML. Every field has a default, so
//! a file only lists what it changes:
//!
//! ```toml
//! seed = 7
//! spawn_policy = "steal_oldest"
//!
//! [hero]
//! health = 6
//!
//! [hero.unlocks]
//! dash = true
//! ```

use std::path::{Path, PathBuf};

use ossuary_shared::{FIXED_TIMESTEP, GRID_CELL_SIZE, PARTICLE_CAPACITY};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`SimConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// What an attack does when its projectile pool is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Drop the spawn and report it.
    #[default]
    Skip,
    /// Finish the oldest active projectile of the kind and reuse its slot.
    StealOldest,
}

/// Slots per projectile pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSizes {
    /// Swipe slashes.
    pub swipe: usize,
    /// Orbs; one volley fires three.
    pub orb: usize,
    /// Bone spears.
    pub bone_spear: usize,
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            swipe: 2,
            orb: 3,
            bone_spear: 1,
        }
    }
}

/// Abilities beyond the swipe, granted by progression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeroUnlocks {
    /// Orb volley.
    pub shooting: bool,
    /// Dash.
    pub dash: bool,
    /// Hand of death.
    pub hand_of_death: bool,
    /// Bone spear.
    pub bone_spear: bool,
}

impl HeroUnlocks {
    /// Every ability unlocked.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            shooting: true,
            dash: true,
            hand_of_death: true,
            bone_spear: true,
        }
    }
}

/// Hero tuning. Durations are seconds, speeds are cells per fixed tick
/// unless noted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeroTuning {
    /// Starting health.
    pub health: i32,
    /// Damage dealt by every attack.
    pub damage: i32,
    /// Walk acceleration.
    pub speed: f32,
    /// Body radius in pixels.
    pub radius: f32,
    /// Whether the hero accepts movement input at all.
    pub can_move: bool,
    /// Abilities available from the start.
    pub unlocks: HeroUnlocks,

    /// Time between swipes.
    pub swipe_cooldown: f32,
    /// Windup before the slash appears.
    pub swipe_windup: f32,
    /// Stun the hero takes while swinging.
    pub swipe_stun: f32,
    /// Distance in pixels from the hero to the slash centre.
    pub swipe_offset: f32,
    /// Slash reach in pixels.
    pub swipe_reach: f32,
    /// Knockback imparted by the slash.
    pub swipe_knockback: f32,

    /// Time between orb volleys.
    pub orb_cooldown: f32,
    /// Angle between the centre orb and each side orb, in degrees.
    pub orb_spread_degrees: f32,
    /// Distance in pixels from the hero where orbs appear.
    pub orb_offset: f32,
    /// Orb travel speed in pixels per second.
    pub orb_speed: f32,
    /// Orb radius in pixels.
    pub orb_radius: f32,
    /// Seconds an orb flies before fizzling.
    pub orb_lifetime: f32,
    /// Knockback imparted by an orb.
    pub orb_knockback: f32,

    /// Time between dashes.
    pub dash_cooldown: f32,
    /// Length of the dash.
    pub dash_duration: f32,
    /// Speed multiplier while dashing.
    pub dash_speed_multiplier: f32,
    /// Invincibility granted by a dash.
    pub dash_invincibility: f32,

    /// Time between hands of death.
    pub hand_of_death_cooldown: f32,
    /// Mobs a hand of death kills at most.
    pub hand_of_death_targets: usize,

    /// Time between bone spears.
    pub bone_spear_cooldown: f32,
    /// Delay between the cast and the eruption.
    pub bone_spear_windup: f32,
    /// How long the spear stays after erupting.
    pub bone_spear_duration: f32,
    /// Eruption reach in pixels.
    pub bone_spear_reach: f32,
    /// Knockback imparted by the eruption.
    pub bone_spear_knockback: f32,

    /// Invincibility after being hit.
    pub hit_invincibility: f32,
    /// Knockback taken when hit.
    pub hit_knockback: f32,
    /// Upward velocity taken when hit.
    pub hit_hop: f32,
    /// Length of the red hit flash.
    pub hit_flash: f32,
    /// Delay between landing dead and the death notification.
    pub death_delay: f32,
}

impl Default for HeroTuning {
    fn default() -> Self {
        Self {
            health: 4,
            damage: 5,
            speed: 0.03,
            radius: 6.0,
            can_move: true,
            unlocks: HeroUnlocks::default(),

            swipe_cooldown: 0.75,
            swipe_windup: 0.2,
            swipe_stun: 0.3,
            swipe_offset: 20.0,
            swipe_reach: 32.0,
            swipe_knockback: 0.1,

            orb_cooldown: 3.0,
            orb_spread_degrees: 20.0,
            orb_offset: 10.0,
            orb_speed: 180.0,
            orb_radius: 5.0,
            orb_lifetime: 1.5,
            orb_knockback: 0.05,

            dash_cooldown: 1.0,
            dash_duration: 0.25,
            dash_speed_multiplier: 5.0,
            dash_invincibility: 0.35,

            hand_of_death_cooldown: 30.0,
            hand_of_death_targets: 5,

            bone_spear_cooldown: 15.0,
            bone_spear_windup: 0.25,
            bone_spear_duration: 0.5,
            bone_spear_reach: 20.0,
            bone_spear_knockback: 0.15,

            hit_invincibility: 2.0,
            hit_knockback: 0.25,
            hit_hop: 0.25,
            hit_flash: 0.25,
            death_delay: 1.0,
        }
    }
}

/// Meat ball tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeatBallTuning {
    /// Starting health.
    pub health: i32,
    /// Chase acceleration in cells per fixed tick.
    pub speed: f32,
    /// Body radius in pixels.
    pub radius: f32,
    /// Shortest sit after spawning, in seconds.
    pub sit_min: f32,
    /// Longest sit after spawning, in seconds.
    pub sit_max: f32,
}

impl Default for MeatBallTuning {
    fn default() -> Self {
        Self {
            health: 10,
            speed: 0.012,
            radius: 7.0,
            sit_min: 1.0,
            sit_max: 2.0,
        }
    }
}

/// Soul collection and levelling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoulTuning {
    /// Souls gained per kill.
    pub per_kill: u32,
    /// Total souls needed for each level, ascending.
    pub level_thresholds: Vec<u32>,
}

impl Default for SoulTuning {
    fn default() -> Self {
        Self {
            per_kill: 1,
            level_thresholds: vec![5, 15, 30, 50],
        }
    }
}

/// Everything tunable about a simulation run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side of a grid cell in pixels.
    pub grid_cell_size: f32,
    /// Particle slots shared by every fx layer.
    pub particle_capacity: usize,
    /// Seconds per fixed physics step.
    pub fixed_timestep: f32,
    /// Fixed steps run per frame at most; leftover time is dropped.
    pub max_substeps: u32,
    /// Longest frame delta accepted; longer frames are clamped.
    pub max_frame_delta: f32,
    /// RNG seed. Equal seeds and inputs give equal runs.
    pub seed: u64,
    /// Notifications buffered before new ones are dropped.
    pub event_capacity: usize,
    /// Behaviour of attacks whose pool is exhausted.
    pub spawn_policy: SpawnPolicy,
    /// Mob slots.
    pub mob_capacity: usize,
    /// Velocity kept per fixed step.
    pub actor_friction: f32,
    /// Downward pull on airborne actors per fixed step.
    pub gravity_z: f32,
    /// Projectile pool sizes.
    pub pools: PoolSizes,
    /// Hero tuning.
    pub hero: HeroTuning,
    /// Meat ball tuning.
    pub meat_ball: MeatBallTuning,
    /// Souls and levels.
    pub souls: SoulTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_cell_size: GRID_CELL_SIZE,
            particle_capacity: PARTICLE_CAPACITY,
            fixed_timestep: FIXED_TIMESTEP,
            max_substeps: 5,
            max_frame_delta: 0.1,
            seed: 0x05_5A_12_E5,
            event_capacity: 1024,
            spawn_policy: SpawnPolicy::Skip,
            mob_capacity: 64,
            actor_friction: 0.82,
            gravity_z: 0.028,
            pools: PoolSizes::default(),
            hero: HeroTuning::default(),
            meat_ball: MeatBallTuning::default(),
            souls: SoulTuning::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), seed = config.seed, "config loaded");
        Ok(config)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        positive("grid_cell_size", self.grid_cell_size)?;
        positive("fixed_timestep", self.fixed_timestep)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        nonzero("particle_capacity", self.particle_capacity)?;
        nonzero("event_capacity", self.event_capacity)?;
        nonzero("mob_capacity", self.mob_capacity)?;
        nonzero("pools.swipe", self.pools.swipe)?;
        nonzero("pools.orb", self.pools.orb)?;
        nonzero("pools.bone_spear", self.pools.bone_spear)?;
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.actor_friction) {
            return Err(invalid("actor_friction must lie in [0, 1]"));
        }

        let hero = &self.hero;
        if hero.health <= 0 {
            return Err(invalid("hero.health must be positive"));
        }
        positive("hero.radius", hero.radius)?;
        positive("hero.swipe_reach", hero.swipe_reach)?;
        positive("hero.orb_radius", hero.orb_radius)?;
        positive("hero.orb_lifetime", hero.orb_lifetime)?;
        positive("hero.bone_spear_reach", hero.bone_spear_reach)?;
        positive("hero.dash_speed_multiplier", hero.dash_speed_multiplier)?;
        // Death is armed on landing, so a hit has to leave the ground.
        positive("hero.hit_hop", hero.hit_hop)?;

        let mob = &self.meat_ball;
        if mob.health <= 0 {
            return Err(invalid("meat_ball.health must be positive"));
        }
        positive("meat_ball.radius", mob.radius)?;
        let finite = mob.sit_min.is_finite() && mob.sit_max.is_finite();
        if !finite || mob.sit_min < 0.0 || mob.sit_min > mob.sit_max {
            return Err(invalid("meat_ball.sit_min and sit_max must be finite with 0 <= sit_min <= sit_max"));
        }

        if self
            .souls
            .level_thresholds
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            return Err(invalid("souls.level_thresholds must be strictly ascending"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

fn positive(name: &str, value: f32) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn nonzero(name: &str, value: usize) -> ConfigResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be at least 1")))
    }
}
