//! Shared state handed to every update.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::assets::AssetTable;
use crate::config::SimConfig;
use crate::events::EventSender;
use crate::level::LevelGrid;

/// What every system reads during a tick: the level, the seeded RNG, the
/// asset table, the tuning, and the notification sender.
///
/// There is exactly one per [`World`](crate::World); nothing in the crate
/// keeps process-wide state.
pub struct SimContext {
    /// Collision grid.
    pub level: LevelGrid,
    /// The only source of randomness in the simulation.
    pub rng: ChaCha8Rng,
    /// Visual handles and clip timings.
    pub assets: AssetTable,
    /// Tuning.
    pub config: SimConfig,
    /// Notification channel.
    pub events: EventSender,
}

impl SimContext {
    /// Builds a context, seeding the RNG from `config.seed`.
    #[must_use]
    pub fn new(config: SimConfig, level: LevelGrid, assets: AssetTable, events: EventSender) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            level,
            assets,
            config,
            events,
        }
    }

    /// Side of one grid cell in pixels.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.level.cell_size()
    }
}
