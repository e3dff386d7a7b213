//! # Cooldown Registry
//!
//! Per-owner map of name → countdown. Entries are kept in the order they
//! were first armed and expire in that order within a tick.

use std::collections::VecDeque;

use crate::error::{CoreError, CoreResult};

/// Timer names are compile-time strings chosen by gameplay code.
pub type TimerName = &'static str;

/// Entries reserved up front; a single actor rarely runs more at once.
const DEFAULT_CAPACITY: usize = 16;

#[derive(Clone, Debug)]
struct Entry<A> {
    name: TimerName,
    duration: f32,
    remaining: f32,
    action: Option<A>,
}

/// An expired timer whose action is due.
#[derive(Clone, Debug, PartialEq)]
pub struct Expired<A> {
    /// Name the timer was armed under.
    pub name: TimerName,
    /// Action supplied when the timer was armed.
    pub action: A,
}

/// Named countdown timers for one owner.
///
/// `A` is the owner's action type. A timer armed with [`Cooldowns::set_with`]
/// yields its action exactly once, through [`Cooldowns::pop_expired`], in the
/// tick its remaining time reaches zero.
///
/// # Example
///
/// ```rust,ignore
/// cd.set_with("delay", 0.2, HeroAction::SpawnSwipe);
///
/// cd.advance(dt);
/// while let Some(expired) = cd.pop_expired() {
///     hero.dispatch(expired.action); // may arm more timers
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Cooldowns<A> {
    entries: Vec<Entry<A>>,
    expired: VecDeque<Expired<A>>,
}

impl<A> Cooldowns<A> {
    /// Creates an empty registry with room for the usual number of timers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry with room for `capacity` timers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            expired: VecDeque::with_capacity(capacity),
        }
    }

    /// Arms `name` for `duration` seconds without an action.
    ///
    /// Re-arming a pending timer replaces its remaining time and drops its
    /// previous action, including one already queued for delivery.
    pub fn set(&mut self, name: TimerName, duration: f32) {
        self.arm(name, duration, None);
    }

    /// Arms `name` for `duration` seconds; `action` is yielded on expiry.
    pub fn set_with(&mut self, name: TimerName, duration: f32, action: A) {
        self.arm(name, duration, Some(action));
    }

    fn arm(&mut self, name: TimerName, duration: f32, action: Option<A>) {
        self.expired.retain(|e| e.name != name);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.duration = duration;
            entry.remaining = duration;
            entry.action = action;
            return;
        }
        self.entries.push(Entry {
            name,
            duration,
            remaining: duration,
            action,
        });
    }

    /// Returns `true` while `name` has time left.
    #[inline]
    #[must_use]
    pub fn has(&self, name: TimerName) -> bool {
        self.entry(name).is_some_and(|e| e.remaining > 0.0)
    }

    /// Seconds left on `name`, if it is pending.
    #[must_use]
    pub fn remaining(&self, name: TimerName) -> Option<f32> {
        self.entry(name).map(|e| e.remaining.max(0.0))
    }

    /// Fraction of `name`'s duration that has elapsed, in `[0, 1]`.
    ///
    /// Infinite timers report 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownTimer`] when `name` was never armed or
    /// has already expired.
    pub fn ratio(&self, name: TimerName) -> CoreResult<f32> {
        let entry = self.entry(name).ok_or(CoreError::UnknownTimer(name))?;
        if entry.duration.is_infinite() {
            return Ok(0.0);
        }
        if entry.duration <= 0.0 {
            return Ok(1.0);
        }
        let elapsed = entry.duration - entry.remaining;
        Ok((elapsed / entry.duration).clamp(0.0, 1.0))
    }

    /// Removes `name` without yielding its action.
    ///
    /// An action already queued by [`Cooldowns::advance`] but not yet popped
    /// is dropped too. Returns `true` if a timer or queued action was
    /// removed.
    pub fn cancel(&mut self, name: TimerName) -> bool {
        let queued = self.expired.len();
        self.expired.retain(|e| e.name != name);
        let dequeued = self.expired.len() != queued;
        match self.entries.iter().position(|e| e.name == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => dequeued,
        }
    }

    /// Counts every timer down by `dt` seconds.
    ///
    /// Timers reaching zero are removed; their actions are queued in arming
    /// order for [`Cooldowns::pop_expired`]. Returns how many timers expired.
    pub fn advance(&mut self, dt: f32) -> usize {
        let expired = &mut self.expired;
        let before = self.entries.len();
        self.entries.retain_mut(|entry| {
            entry.remaining -= dt;
            if entry.remaining > 0.0 {
                return true;
            }
            if let Some(action) = entry.action.take() {
                expired.push_back(Expired {
                    name: entry.name,
                    action,
                });
            }
            false
        });
        before - self.entries.len()
    }

    /// Takes the next due action, oldest first.
    pub fn pop_expired(&mut self) -> Option<Expired<A>> {
        self.expired.pop_front()
    }

    /// Number of pending timers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timer is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every timer and every undelivered action.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.expired.clear();
    }

    fn entry(&self, name: TimerName) -> Option<&Entry<A>> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl<A> Default for Cooldowns<A> {
    fn default() -> Self {
        Self::new()
    }
}
