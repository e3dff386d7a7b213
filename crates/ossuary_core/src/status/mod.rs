//! # Status Effects
//!
//! Timed modifiers (invincibility, stun) attached to one entity.

mod effects;

pub use effects::{EffectKind, Effectible, Effects, Refresh};
