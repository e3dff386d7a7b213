//! # OSSUARY Core
//!
//! Allocation-free building blocks for a frame-stepped action game:
//! - Every pool is sized once and never grows
//! - Timers expire in the order they were armed
//! - Status effects are removed only after the whole effect pass ran
//!
//! ## Example
//!
//! ```rust,ignore
//! use ossuary_core::{Cooldowns, ObjectPool};
//!
//! let mut pool: ObjectPool<Bullet> = ObjectPool::new(64, |_| Bullet::default());
//! let handle = pool.alloc()?;
//!
//! let mut cd: Cooldowns<Action> = Cooldowns::new();
//! cd.set_with("windup", 0.2, Action::Fire);
//! cd.advance(dt);
//! while let Some(expired) = cd.pop_expired() {
//!     // dispatch expired.action
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;
pub mod status;
pub mod timer;

pub use error::{lifecycle_violation, CoreError, CoreResult};
pub use memory::{ObjectPool, PoolHandle};
pub use status::{EffectKind, Effectible, Effects, Refresh};
pub use timer::{Cooldowns, Expired, TimerName};
