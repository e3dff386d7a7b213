//! Hit resolution.
//!
//! Overlap is tested on squared distances, so a pass over every target costs
//! no square roots.

use ossuary_core::{ObjectPool, PoolHandle};
use ossuary_shared::{angle_between, Vec2};

/// Something a projectile can strike.
pub trait HitTarget {
    /// Centre in pixels.
    fn position(&self) -> Vec2;

    /// Collision radius in pixels.
    fn radius(&self) -> f32;

    /// Whether strikes land at all. Dead targets return `false`.
    fn is_hittable(&self) -> bool;

    /// Applies `damage` coming from direction `angle` (radians).
    fn take_hit(&mut self, damage: i32, angle: f32);

    /// Adds `impulse` to the target's velocity.
    fn push(&mut self, impulse: Vec2);
}

/// One damaging area at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Centre of the struck area.
    pub origin: Vec2,
    /// Radius of the struck area.
    pub reach: f32,
    /// Where the attacker stands. Knockback points away from here.
    pub attacker: Vec2,
    /// Damage dealt to each target.
    pub damage: i32,
    /// Knockback speed imparted to each target.
    pub knockback: f32,
}

impl Strike {
    /// Returns `true` if `target` overlaps the struck area. Touching counts.
    #[inline]
    #[must_use]
    pub fn reaches<T: HitTarget + ?Sized>(&self, target: &T) -> bool {
        let dist = self.reach + target.radius();
        self.origin.distance_squared(target.position()) <= dist * dist
    }

    /// Damages `target` and pushes it along the attacker→target angle.
    pub fn land<T: HitTarget + ?Sized>(&self, target: &mut T) {
        let angle = angle_between(self.attacker, target.position());
        target.take_hit(self.damage, angle);
        target.push(Vec2::from_angle(angle) * self.knockback);
    }
}

/// Lands `strike` on every hittable target it reaches, once each.
///
/// Returns the number of targets hit.
pub fn resolve_hits<T: HitTarget>(strike: &Strike, targets: &mut ObjectPool<T>) -> usize {
    let mut hits = 0;
    for (_, target) in targets.iter_mut() {
        if target.is_hittable() && strike.reaches(&*target) {
            strike.land(target);
            hits += 1;
        }
    }
    hits
}

/// Lands `strike` on the first hittable target it reaches, in slot order.
pub fn resolve_first_hit<T: HitTarget>(strike: &Strike, targets: &mut ObjectPool<T>) -> Option<PoolHandle> {
    let (handle, target) = targets
        .iter_mut()
        .find(|(_, target)| target.is_hittable() && strike.reaches(&**target))?;
    strike.land(target);
    Some(handle)
}
