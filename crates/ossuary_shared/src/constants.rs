//! # Simulation Constants
//!
//! Baseline tuning shared by the core and the game crate. Runtime overrides
//! go through `ossuary::config::SimConfig`; these are its defaults.

/// Size of one level grid cell in world pixels.
pub const GRID_CELL_SIZE: f32 = 16.0;

/// Presentation tick rate the driver is expected to run at.
pub const TICK_RATE: u32 = 60;

/// Frame rate that particle velocities are expressed against.
///
/// A particle `x_delta` of 1.0 moves one pixel per frame at this rate.
pub const REFERENCE_FPS: f32 = 60.0;

/// Fixed-rate physics step in seconds (30 Hz).
pub const FIXED_TIMESTEP: f32 = 1.0 / 30.0;

/// Default slot count of the particle simulator.
pub const PARTICLE_CAPACITY: usize = 2048;
