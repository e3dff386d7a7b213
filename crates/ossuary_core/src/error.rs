//! # Core Error Types
//!
//! Two families live here. Resource exhaustion (`PoolExhausted`,
//! `SimulatorFull`) is expected under load and the caller drops whatever it
//! was about to spawn. Lifecycle misuse (`DoubleFree`, `InvalidHandle`,
//! `InvalidState`) is a bug in the caller and goes through
//! [`lifecycle_violation`].

use thiserror::Error;

/// Errors raised by the simulation primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Every instance of a pool is in use.
    #[error("pool exhausted: all {capacity} instances in use")]
    PoolExhausted {
        /// Capacity of the pool.
        capacity: usize,
    },

    /// Every particle slot is live.
    #[error("particle simulator full: all {capacity} slots live")]
    SimulatorFull {
        /// Slot count of the simulator.
        capacity: usize,
    },

    /// A pool slot was freed while already free.
    #[error("double free of pool slot {index}")]
    DoubleFree {
        /// Slot index.
        index: usize,
    },

    /// A handle points outside the pool.
    #[error("invalid pool handle {index} (capacity {capacity})")]
    InvalidHandle {
        /// Slot index carried by the handle.
        index: usize,
        /// Capacity of the pool.
        capacity: usize,
    },

    /// A timer was queried that was never armed or has already expired.
    #[error("unknown timer: {0}")]
    UnknownTimer(&'static str),

    /// An object was driven through a transition its current state forbids,
    /// such as activating a projectile that is already in flight.
    #[error("invalid state transition: {0}")]
    InvalidState(&'static str),
}

impl CoreError {
    /// Returns `true` for conditions the caller recovers from by skipping
    /// the requested spawn.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PoolExhausted { .. } | Self::SimulatorFull { .. } | Self::UnknownTimer(_)
        )
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reports a lifecycle bug.
///
/// Development builds panic so the bug surfaces at its source. Release builds
/// log the error and carry on with the offending call treated as a no-op.
///
/// # Panics
///
/// Panics when `debug_assertions` are enabled.
#[track_caller]
pub fn lifecycle_violation(err: &CoreError) {
    if cfg!(debug_assertions) {
        panic!("lifecycle violation: {err}");
    }
    tracing::error!(error = %err, "lifecycle violation ignored");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(CoreError::PoolExhausted { capacity: 3 }.is_recoverable());
        assert!(CoreError::SimulatorFull { capacity: 2048 }.is_recoverable());
        assert!(CoreError::UnknownTimer("hit").is_recoverable());
        assert!(!CoreError::DoubleFree { index: 0 }.is_recoverable());
        assert!(!CoreError::InvalidHandle { index: 9, capacity: 2 }.is_recoverable());
        assert!(!CoreError::InvalidState("activate while active").is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::PoolExhausted { capacity: 3 };
        assert_eq!(err.to_string(), "pool exhausted: all 3 instances in use");
        assert_eq!(CoreError::UnknownTimer("dash").to_string(), "unknown timer: dash");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "lifecycle violation")]
    fn test_lifecycle_violation_panics_in_debug() {
        lifecycle_violation(&CoreError::DoubleFree { index: 1 });
    }
}
