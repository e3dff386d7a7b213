//! # Memory Management
//!
//! Pre-constructed instance pools for zero-allocation gameplay.
//!
//! ## Design Philosophy
//!
//! All instances are built once when the owning system starts. During
//! gameplay:
//! - No construction or destruction, only handing slots out and back
//! - No growth past the configured capacity
//! - Exhaustion is reported, never papered over

mod pool;

pub use pool::{ObjectPool, PoolHandle};
