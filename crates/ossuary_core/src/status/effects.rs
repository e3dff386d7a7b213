//! # Effect Registry
//!
//! One remaining-duration slot per [`EffectKind`], plus the list of kinds
//! that ran out during the current pass. Removal happens only after every
//! end hook of the pass has run, so hooks may add or remove effects freely.

/// The closed set of status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EffectKind {
    /// Ignores incoming hits.
    Invincible = 0,
    /// Blocks movement input.
    Stun = 1,
}

impl EffectKind {
    /// Number of effect kinds.
    pub const COUNT: usize = 2;

    /// Every kind, in update order.
    pub const ALL: [Self; Self::COUNT] = [Self::Invincible, Self::Stun];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// How re-applying an active effect combines with its remaining time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Refresh {
    /// Remaining time becomes the new duration.
    #[default]
    Overwrite,
    /// Keeps whichever of the two is longer.
    Max,
    /// Adds the new duration to what is left.
    Extend,
}

/// Remaining durations for every effect kind on one entity.
#[derive(Clone, Debug)]
pub struct Effects {
    remaining: [Option<f32>; EffectKind::COUNT],
    pending_removal: Vec<EffectKind>,
}

impl Effects {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: [None; EffectKind::COUNT],
            pending_removal: Vec::with_capacity(EffectKind::COUNT),
        }
    }

    /// Applies `kind` for `duration` seconds.
    ///
    /// Returns `true` when the effect was not active before, i.e. when the
    /// owner's start hook is due. Non-positive and NaN durations are ignored.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn insert(&mut self, kind: EffectKind, duration: f32, refresh: Refresh) -> bool {
        if !(duration > 0.0) {
            return false;
        }
        let slot = &mut self.remaining[kind.index()];
        if let Some(left) = slot.as_mut().filter(|left| **left > 0.0) {
            *left = match refresh {
                Refresh::Overwrite => duration,
                Refresh::Max => (*left).max(duration),
                Refresh::Extend => *left + duration,
            };
            return false;
        }
        *slot = Some(duration);
        true
    }

    /// Returns `true` while `kind` has time left.
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.remaining[kind.index()].is_some_and(|left| left > 0.0)
    }

    /// Seconds left on `kind`.
    #[inline]
    #[must_use]
    pub fn remaining(&self, kind: EffectKind) -> Option<f32> {
        self.remaining[kind.index()].filter(|left| *left > 0.0)
    }

    /// Drops `kind`. Returns `true` if it was active.
    pub fn remove(&mut self, kind: EffectKind) -> bool {
        let was_active = self.contains(kind);
        self.remaining[kind.index()] = None;
        was_active
    }

    /// Iterates over active kinds in update order.
    pub fn active(&self) -> impl Iterator<Item = EffectKind> + '_ {
        EffectKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }

    /// Counts every active effect down by `dt` and queues the ones that ran
    /// out. Returns how many were queued.
    pub fn decay(&mut self, dt: f32) -> usize {
        self.pending_removal.clear();
        for kind in EffectKind::ALL {
            if let Some(left) = &mut self.remaining[kind.index()] {
                *left -= dt;
                if *left <= 0.0 {
                    self.pending_removal.push(kind);
                }
            }
        }
        self.pending_removal.len()
    }

    /// Kind queued at position `index` by the last [`Effects::decay`].
    #[inline]
    #[must_use]
    pub fn pending_at(&self, index: usize) -> Option<EffectKind> {
        self.pending_removal.get(index).copied()
    }

    /// Removes queued kinds that are still expired.
    ///
    /// A kind re-applied by an end hook survives.
    pub fn flush_pending(&mut self) {
        for kind in self.pending_removal.drain(..) {
            let slot = &mut self.remaining[kind.index()];
            if slot.is_some_and(|left| left <= 0.0) {
                *slot = None;
            }
        }
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity that can carry status effects.
///
/// Implementors expose their [`Effects`] and may override the gate and the
/// start/end hooks; everything else has a default.
pub trait Effectible {
    /// The entity's effect registry.
    fn effects(&self) -> &Effects;

    /// The entity's effect registry, mutably.
    fn effects_mut(&mut self) -> &mut Effects;

    /// Whether new effects are accepted at all.
    fn is_effectible(&self) -> bool {
        true
    }

    /// Runs when an inactive effect becomes active.
    fn on_effect_start(&mut self, _kind: EffectKind) {}

    /// Runs when an effect runs out or is removed.
    fn on_effect_end(&mut self, _kind: EffectKind) {}

    /// Applies `kind`, overwriting any remaining time.
    ///
    /// Silently ignored when the entity is not effectible.
    fn add_effect(&mut self, kind: EffectKind, duration: f32) {
        self.add_effect_with(kind, duration, Refresh::Overwrite);
    }

    /// Applies `kind` with an explicit refresh policy.
    fn add_effect_with(&mut self, kind: EffectKind, duration: f32, refresh: Refresh) {
        if !self.is_effectible() {
            return;
        }
        if self.effects_mut().insert(kind, duration, refresh) {
            self.on_effect_start(kind);
        }
    }

    /// Returns `true` while `kind` is active.
    fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects().contains(kind)
    }

    /// Cancels `kind`, running its end hook if it was active.
    fn remove_effect(&mut self, kind: EffectKind) {
        if self.effects_mut().remove(kind) {
            self.on_effect_end(kind);
        }
    }

    /// Counts effects down by `dt`, running end hooks for the ones that ran
    /// out, then removes them.
    fn update_effects(&mut self, dt: f32) {
        let ended = self.effects_mut().decay(dt);
        for index in 0..ended {
            if let Some(kind) = self.effects().pending_at(index) {
                self.on_effect_end(kind);
            }
        }
        self.effects_mut().flush_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dummy {
        effects: Effects,
        health: i32,
        started: Vec<EffectKind>,
        ended: Vec<EffectKind>,
        reapply_on_end: bool,
    }

    impl Effectible for Dummy {
        fn effects(&self) -> &Effects {
            &self.effects
        }
        fn effects_mut(&mut self) -> &mut Effects {
            &mut self.effects
        }
        fn is_effectible(&self) -> bool {
            self.health > 0
        }
        fn on_effect_start(&mut self, kind: EffectKind) {
            self.started.push(kind);
        }
        fn on_effect_end(&mut self, kind: EffectKind) {
            self.ended.push(kind);
            if self.reapply_on_end && kind == EffectKind::Stun {
                self.reapply_on_end = false;
                self.add_effect(EffectKind::Stun, 1.0);
            }
        }
    }

    fn alive() -> Dummy {
        Dummy {
            health: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_stun_ends_exactly_once() {
        let mut d = alive();
        d.add_effect(EffectKind::Stun, 0.3);
        assert!(d.has_effect(EffectKind::Stun));

        d.update_effects(0.3);
        assert_eq!(d.ended, vec![EffectKind::Stun]);
        assert!(!d.has_effect(EffectKind::Stun));

        d.update_effects(0.3);
        assert_eq!(d.ended.len(), 1);
    }

    #[test]
    fn test_nan_duration_ignored() {
        let mut d = alive();
        d.add_effect(EffectKind::Stun, f32::NAN);
        assert!(!d.has_effect(EffectKind::Stun));
        assert!(d.started.is_empty());

        d.add_effect(EffectKind::Stun, 0.5);
        d.add_effect(EffectKind::Stun, f32::NAN);
        d.update_effects(0.5);
        assert_eq!(d.started, vec![EffectKind::Stun]);
        assert_eq!(d.ended, vec![EffectKind::Stun]);
    }

    #[test]
    fn test_refresh_overwrites_and_starts_once() {
        let mut d = alive();
        d.add_effect(EffectKind::Invincible, 2.0);
        d.update_effects(1.5);
        d.add_effect(EffectKind::Invincible, 0.35);

        assert_eq!(d.started, vec![EffectKind::Invincible]);
        let left = d.effects().remaining(EffectKind::Invincible).unwrap();
        assert!((left - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_refresh_policies() {
        let mut effects = Effects::new();
        assert!(effects.insert(EffectKind::Stun, 1.0, Refresh::Overwrite));
        assert!(!effects.insert(EffectKind::Stun, 0.5, Refresh::Max));
        assert_eq!(effects.remaining(EffectKind::Stun), Some(1.0));
        assert!(!effects.insert(EffectKind::Stun, 0.5, Refresh::Extend));
        assert_eq!(effects.remaining(EffectKind::Stun), Some(1.5));
        assert!(!effects.insert(EffectKind::Invincible, 0.0, Refresh::Overwrite));
    }

    #[test]
    fn test_not_effectible_is_silent_noop() {
        let mut d = Dummy::default();
        d.add_effect(EffectKind::Stun, 1.0);
        assert!(!d.has_effect(EffectKind::Stun));
        assert!(d.started.is_empty());
    }

    #[test]
    fn test_infinite_invincibility() {
        let mut d = alive();
        d.add_effect(EffectKind::Invincible, f32::INFINITY);
        for _ in 0..1000 {
            d.update_effects(10.0);
        }
        assert!(d.has_effect(EffectKind::Invincible));
        assert!(d.ended.is_empty());
    }

    #[test]
    fn test_end_hook_may_reapply() {
        let mut d = alive();
        d.reapply_on_end = true;
        d.add_effect(EffectKind::Stun, 0.1);
        d.update_effects(0.2);

        assert_eq!(d.ended, vec![EffectKind::Stun]);
        assert!(d.has_effect(EffectKind::Stun));
    }

    #[test]
    fn test_remove_runs_end_hook() {
        let mut d = alive();
        d.add_effect(EffectKind::Invincible, 5.0);
        d.add_effect(EffectKind::Stun, 5.0);
        d.remove_effect(EffectKind::Invincible);
        d.remove_effect(EffectKind::Invincible);

        assert_eq!(d.ended, vec![EffectKind::Invincible]);
        assert_eq!(d.effects().active().collect::<Vec<_>>(), vec![EffectKind::Stun]);
    }
}
