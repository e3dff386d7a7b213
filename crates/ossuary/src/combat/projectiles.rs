//! # Projectile Pools
//!
//! One fixed pool per [`ProjectileKind`]. A spawn that finds its pool
//! exhausted is resolved by the configured [`SpawnPolicy`]. Projectiles that
//! finish during [`Projectiles::update`] are released and freed through the
//! handle recorded when they were spawned.

use ossuary_core::{lifecycle_violation, ObjectPool, PoolHandle};

use crate::assets::AssetTable;
use crate::combat::hits::HitTarget;
use crate::combat::projectile::{Launch, Projectile, ProjectileKind, ProjectilePhase};
use crate::config::{PoolSizes, SpawnPolicy};
use crate::events::{EventSender, SimEvent};
use crate::fx::{DrawSink, FxLayer};
use crate::level::CollisionQuery;

/// Identifies one spawned projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileHandle {
    /// Pool the projectile lives in.
    pub kind: ProjectileKind,
    /// Slot inside that pool.
    pub slot: PoolHandle,
}

/// The hero's projectile pools.
pub struct Projectiles {
    pools: [ObjectPool<Projectile>; ProjectileKind::COUNT],
    policy: SpawnPolicy,
    next_serial: u64,
    /// Handles finished during the current update.
    finished: Vec<ProjectileHandle>,
}

impl Projectiles {
    /// Creates one pool per kind with the configured sizes.
    ///
    /// # Panics
    ///
    /// Panics if a pool size is zero. [`SimConfig::validate`] rejects that.
    ///
    /// [`SimConfig::validate`]: crate::config::SimConfig::validate
    #[must_use]
    pub fn new(sizes: &PoolSizes, policy: SpawnPolicy) -> Self {
        let size_of = |kind: ProjectileKind| match kind {
            ProjectileKind::Swipe => sizes.swipe,
            ProjectileKind::Orb => sizes.orb,
            ProjectileKind::BoneSpear => sizes.bone_spear,
        };
        let pools = ProjectileKind::ALL.map(|kind| ObjectPool::new(size_of(kind), |_| Projectile::new(kind)));
        let total = pools.iter().map(ObjectPool::capacity).sum();
        Self {
            pools,
            policy,
            next_serial: 0,
            finished: Vec::with_capacity(total),
        }
    }

    /// Exhaustion policy in force.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    /// Activates a projectile of `kind`.
    ///
    /// Returns `None` when the pool is exhausted and the policy is
    /// [`SpawnPolicy::Skip`]; a [`SimEvent::PoolExhausted`] is sent in that
    /// case.
    pub fn spawn(&mut self, kind: ProjectileKind, launch: &Launch, events: &EventSender) -> Option<ProjectileHandle> {
        let pool = &mut self.pools[kind.index()];
        let slot = match pool.alloc() {
            Ok(slot) => slot,
            Err(err) => match self.policy {
                SpawnPolicy::Skip => {
                    tracing::debug!(error = %err, ?kind, "projectile spawn skipped");
                    events.send(SimEvent::PoolExhausted { kind });
                    return None;
                }
                SpawnPolicy::StealOldest => {
                    // Every live slot may already be finished and awaiting release.
                    let Some(slot) = Self::oldest_active(pool) else {
                        tracing::debug!(error = %err, ?kind, "no active projectile to steal");
                        events.send(SimEvent::PoolExhausted { kind });
                        return None;
                    };
                    tracing::debug!(?kind, slot = slot.index(), "oldest projectile stolen");
                    let stolen = pool.get_mut(slot)?;
                    stolen.finish();
                    stolen.release();
                    slot
                }
            },
        };

        let serial = self.next_serial;
        self.next_serial += 1;
        pool.get_mut(slot)?.activate(launch, serial);
        Some(ProjectileHandle { kind, slot })
    }

    /// Advances every active projectile, then frees the ones that finished.
    ///
    /// Returns the number of targets struck.
    pub fn update<T: HitTarget>(
        &mut self,
        dt: f32,
        collision: &dyn CollisionQuery,
        cell_size: f32,
        targets: &mut ObjectPool<T>,
    ) -> usize {
        let mut hits = 0;
        for (kind, pool) in ProjectileKind::ALL.into_iter().zip(self.pools.iter_mut()) {
            for (slot, projectile) in pool.iter_mut() {
                hits += projectile.update(dt, collision, cell_size, targets);
                if projectile.phase() == ProjectilePhase::Finished {
                    self.finished.push(ProjectileHandle { kind, slot });
                }
            }
        }

        let pools = &mut self.pools;
        for handle in self.finished.drain(..) {
            release(pools, handle);
        }
        hits
    }

    /// Live projectiles across every pool.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.pools.iter().map(ObjectPool::live_count).sum()
    }

    /// Live projectiles of `kind`.
    #[inline]
    #[must_use]
    pub fn live_count_of(&self, kind: ProjectileKind) -> usize {
        self.pools[kind.index()].live_count()
    }

    /// The projectile behind `handle`, if still live.
    #[must_use]
    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.pools[handle.kind.index()].get(handle.slot)
    }

    /// Iterates live projectiles, pool by pool.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        ProjectileKind::ALL
            .into_iter()
            .zip(self.pools.iter())
            .flat_map(|(kind, pool)| pool.iter().map(move |(slot, p)| (ProjectileHandle { kind, slot }, p)))
    }

    /// Submits every active projectile to `sink` on the foreground layer.
    pub fn draw(&self, assets: &AssetTable, sink: &mut dyn DrawSink) {
        for (handle, projectile) in self.iter() {
            let visual = match handle.kind {
                ProjectileKind::Swipe => assets.swipe,
                ProjectileKind::Orb => assets.orb,
                ProjectileKind::BoneSpear => assets.bone_spear,
            };
            sink.submit(FxLayer::TopNormal, projectile.sprite(visual));
        }
    }

    /// Finishes and frees every live projectile.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            for (_, projectile) in pool.iter_mut() {
                projectile.finish();
                projectile.release();
            }
            pool.clear();
        }
    }

    fn oldest_active(pool: &ObjectPool<Projectile>) -> Option<PoolHandle> {
        pool.iter()
            .filter(|(_, p)| p.is_active())
            .min_by_key(|(_, p)| p.serial())
            .map(|(slot, _)| slot)
    }
}

/// Returns a finished projectile to its idle state and its slot to the pool.
fn release(pools: &mut [ObjectPool<Projectile>; ProjectileKind::COUNT], handle: ProjectileHandle) {
    let pool = &mut pools[handle.kind.index()];
    if let Some(projectile) = pool.get_mut(handle.slot) {
        projectile.release();
    }
    if let Err(err) = pool.free(handle.slot) {
        lifecycle_violation(&err);
    }
}
