//! Draw-batch hand-off.
//!
//! The simulation owns no rendering state. Once a tick is done, whatever
//! should be visible is pushed into a [`DrawSink`] as plain-old-data
//! [`SpriteInstance`]s that a renderer can upload without conversion.

use bytemuck::{Pod, Zeroable};

use crate::assets::VisualHandle;

/// Presentation batch a sprite belongs to.
///
/// Background layers draw under the actors, top layers over them. Additive
/// layers blend by adding colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FxLayer {
    /// Background, additive blend.
    BgAdd = 0,
    /// Background, normal blend.
    BgNormal = 1,
    /// Foreground, normal blend.
    TopNormal = 2,
    /// Foreground, additive blend.
    TopAdd = 3,
}

impl FxLayer {
    /// Number of layers.
    pub const COUNT: usize = 4;

    /// Every layer in draw order.
    pub const ALL: [Self; Self::COUNT] = [Self::BgAdd, Self::BgNormal, Self::TopNormal, Self::TopAdd];

    /// Position in [`FxLayer::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Linear RGBA colour.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Builds a colour from components.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque colour from `0xRRGGBB`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rgb_hex(hex: u32) -> Self {
        Self::rgba(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
            1.0,
        )
    }

    /// Components as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One sprite to draw, laid out for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// World position in pixels.
    pub position: [f32; 2],
    /// Scale on each axis.
    pub scale: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    /// Opaque visual handle.
    pub visual: VisualHandle,
    /// Tint, alpha premultiplied into `[3]`.
    pub color: [f32; 4],
}

/// Receiver of finished visual state.
pub trait DrawSink {
    /// Takes one sprite for `layer`.
    fn submit(&mut self, layer: FxLayer, sprite: SpriteInstance);
}

impl DrawSink for Vec<(FxLayer, SpriteInstance)> {
    fn submit(&mut self, layer: FxLayer, sprite: SpriteInstance) {
        self.push((layer, sprite));
    }
}
