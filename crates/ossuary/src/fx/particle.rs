//! Particle record.

use crate::assets::VisualHandle;
use crate::fx::draw::{Color, SpriteInstance};

/// Per-particle behaviour run after integration.
///
/// Dispatched through a fixed function table, so adding a variant means
/// adding a row there too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParticlePhysics {
    /// Integration only.
    #[default]
    None = 0,
    /// Falls, latches onto the first solid cell it touches, then slides.
    Blood = 1,
    /// Bounces off walls and settles at its target height.
    Ground = 2,
}

impl ParticlePhysics {
    /// Number of behaviours.
    pub const COUNT: usize = 3;
}

/// One simulated particle.
///
/// Velocities, gravity and deltas are per 60 Hz frame. `life` is seconds.
/// `data0` and `data1` are scratch space owned by the physics behaviour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// What to draw.
    pub visual: VisualHandle,
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels, growing downward.
    pub y: f32,
    /// X velocity.
    pub dx: f32,
    /// Y velocity.
    pub dy: f32,
    /// Added to `dy` every frame.
    pub gravity_y: f32,
    /// Velocity kept per frame.
    pub friction: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Added to `rotation` every frame.
    pub rotation_delta: f32,
    /// X scale.
    pub scale_x: f32,
    /// Y scale.
    pub scale_y: f32,
    /// Added to `scale_x` every frame.
    pub scale_delta_x: f32,
    /// Added to `scale_y` every frame.
    pub scale_delta_y: f32,
    /// Tint.
    pub color: Color,
    /// Opacity multiplied into the tint.
    pub alpha: f32,
    /// Seconds left to live.
    pub life: f32,
    /// Scratch field. Blood and Ground keep their target height here.
    pub data0: f32,
    /// Scratch field. Blood keeps its latch here, Ground its bounce count.
    pub data1: f32,
    /// Behaviour run after integration.
    pub physics: ParticlePhysics,
}

impl Particle {
    /// A particle at `(x, y)` with every other field at its default: still,
    /// unrotated, unit scale, white, opaque, no life left, no physics.
    #[must_use]
    pub const fn new(visual: VisualHandle, x: f32, y: f32) -> Self {
        Self {
            visual,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            gravity_y: 0.0,
            friction: 1.0,
            rotation: 0.0,
            rotation_delta: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_delta_x: 0.0,
            scale_delta_y: 0.0,
            color: Color::WHITE,
            alpha: 1.0,
            life: 0.0,
            data0: 0.0,
            data1: 0.0,
            physics: ParticlePhysics::None,
        }
    }

    /// Advances position, velocity, rotation and scale by `tmod` frames.
    #[inline]
    pub fn integrate(&mut self, tmod: f32) {
        self.dy += self.gravity_y * tmod;
        self.x += self.dx * tmod;
        self.y += self.dy * tmod;
        let keep = self.friction.powf(tmod);
        self.dx *= keep;
        self.dy *= keep;
        self.rotation += self.rotation_delta * tmod;
        self.scale_x += self.scale_delta_x * tmod;
        self.scale_y += self.scale_delta_y * tmod;
    }

    /// Draw data for this particle.
    #[must_use]
    pub fn sprite(&self) -> SpriteInstance {
        SpriteInstance {
            position: [self.x, self.y],
            scale: [self.scale_x, self.scale_y],
            rotation: self.rotation,
            visual: self.visual,
            color: [
                self.color.r,
                self.color.g,
                self.color.b,
                self.color.a * self.alpha,
            ],
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(VisualHandle::default(), 0.0, 0.0)
    }
}
