//! # Timers
//!
//! Named countdowns owned by one entity. Expiry produces a value of the
//! owner's action type instead of running a stored closure, so the owner
//! dispatches it with full mutable access to itself.

mod cooldown;

pub use cooldown::{Cooldowns, Expired, TimerName};
