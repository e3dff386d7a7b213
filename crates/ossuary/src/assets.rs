//! Opaque visual handles and the clip timings gameplay depends on.
//!
//! The simulation never looks inside a handle; it only carries it from the
//! allocation call to the draw sink. Loading atlases and resolving handles to
//! textures is the presentation layer's business.

use bytemuck::{Pod, Zeroable};

/// Reference to a sprite or texture slice owned by the presentation layer.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct VisualHandle(pub u32);

/// Number of gib variants in the meat ball explosion.
pub const GIB_VARIANTS: usize = 3;

/// Handles and clip durations the simulation needs.
///
/// `Default` numbers the handles sequentially, which is what the headless
/// driver and the tests use. A renderer builds its own table with the ids it
/// registered.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetTable {
    /// Small drop shadow.
    pub shadow_small: VisualHandle,
    /// Big eye thrown out of an exploding meat ball.
    pub fx_big_eye: VisualHandle,
    /// Little eye thrown out of an exploding meat ball.
    pub fx_little_eye: VisualHandle,
    /// Meat ball leg.
    pub fx_meat_leg: VisualHandle,
    /// Gib variants, picked at random.
    pub fx_gibs: [VisualHandle; GIB_VARIANTS],
    /// Dust speck kicked up from the floor.
    pub fx_dust: VisualHandle,
    /// Level-up sparkle.
    pub fx_sparkle: VisualHandle,
    /// Swipe slash sprite.
    pub swipe: VisualHandle,
    /// Orb sprite.
    pub orb: VisualHandle,
    /// Bone spear sprite.
    pub bone_spear: VisualHandle,

    /// Seconds the swipe slash animation plays; the swipe lives this long.
    pub swipe_clip: f32,
    /// Seconds the meat ball stand-up animation plays.
    pub meat_ball_stand_up_clip: f32,
}

impl Default for AssetTable {
    fn default() -> Self {
        Self {
            shadow_small: VisualHandle(1),
            fx_big_eye: VisualHandle(2),
            fx_little_eye: VisualHandle(3),
            fx_meat_leg: VisualHandle(4),
            fx_gibs: [VisualHandle(5), VisualHandle(6), VisualHandle(7)],
            fx_dust: VisualHandle(8),
            fx_sparkle: VisualHandle(9),
            swipe: VisualHandle(10),
            orb: VisualHandle(11),
            bone_spear: VisualHandle(12),
            swipe_clip: 0.3,
            meat_ball_stand_up_clip: 0.5,
        }
    }
}
