//! # OSSUARY
//!
//! Frame-stepped simulation of a small top-down action game: a hero with a
//! handful of abilities, meat balls that chase it, pooled projectiles and a
//! layered particle system.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            World                                │
//! │                                                                 │
//! │  ┌───────────┐   ┌────────────┐   ┌─────────────┐   ┌────────┐  │
//! │  │  actor    │──>│  combat    │──>│     fx      │──>│DrawSink│  │
//! │  │ hero, mob │   │ projectile │   │ particles   │   └────────┘  │
//! │  └─────┬─────┘   └─────┬──────┘   └──────┬──────┘               │
//! │        │               │                 │                      │
//! │        └───────────────┴──── level ──────┘       ┌───────────┐  │
//! │                    (collision queries)      ───> │ SimEvent  │  │
//! │                                                  └───────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here renders. Sprites leave through [`fx::DrawSink`]; lifecycle
//! notifications leave through the [`events`] channel.
//!
//! ## Modules
//!
//! - `level`: Collision grid and line of sight
//! - `config`: TOML tuning
//! - `events`: Notifications for presentation and audio
//! - `fx`: Particle simulator and effect catalogue
//! - `combat`: Projectiles and hit resolution
//! - `actor`: Hero and meat ball behaviour
//! - `world`: The per-frame loop

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod assets;
pub mod combat;
pub mod config;
pub mod context;
pub mod events;
pub mod fx;
pub mod level;
pub mod world;

pub use ossuary_core as core;
pub use ossuary_shared as shared;

pub use actor::{Actor, HeroInput};
pub use assets::{AssetTable, VisualHandle};
pub use config::{ConfigError, ConfigResult, SimConfig, SpawnPolicy};
pub use context::SimContext;
pub use events::{EventBus, EventReceiver, EventSender, SimEvent};
pub use fx::{DrawSink, FxLayer, SpriteInstance};
pub use level::{CollisionQuery, LevelGrid};
pub use world::{FrameStats, World};
