//! # OSSUARY Shared
//!
//! Math types and tuning constants used by every crate in the workspace.
//!
//! Nothing here owns simulation state. If a type needs a tick, it belongs in
//! `ossuary_core` or `ossuary`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    FIXED_TIMESTEP, GRID_CELL_SIZE, PARTICLE_CAPACITY, REFERENCE_FPS, TICK_RATE,
};
pub use math::{angle_between, Vec2};
