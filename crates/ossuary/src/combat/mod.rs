//! # Combat
//!
//! Pooled projectiles and the hit resolution they share.

mod hits;
mod projectile;
mod projectiles;

pub use hits::{resolve_first_hit, resolve_hits, HitTarget, Strike};
pub use projectile::{Launch, Projectile, ProjectileKind, ProjectilePhase, Transform};
pub use projectiles::{ProjectileHandle, Projectiles};
