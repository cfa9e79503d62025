//! Map-space ↔ screen-space transform.
//!
//! ```text
//! screen = (x · s, −y · s) + offset           s = scale_factor / 20
//! offset = centre − (px · s, −py · s) + pan   (recomputed every frame)
//! ```
//!
//! Map +y points north, screen +y points down, hence the flip.

use glam::{Vec2, vec2};

use crate::world::FrameState;

pub const NATIVE_WIDTH: usize = 320;
pub const NATIVE_HEIGHT: usize = 200;
pub const SCALE_FACTOR: f32 = 5.0;
/// Map units per native pixel at scale factor 1.
pub const UNITS_PER_STEP: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// surface size in pixels
    pub size: Vec2,
    /// pixels per map unit
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(
            NATIVE_WIDTH as f32 * SCALE_FACTOR,
            NATIVE_HEIGHT as f32 * SCALE_FACTOR,
            SCALE_FACTOR,
        )
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            size: vec2(width, height),
            scale: scale_factor / UNITS_PER_STEP,
        }
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Scale and flip without translating.
    #[inline]
    pub fn scaled(&self, p: Vec2) -> Vec2 {
        vec2(p.x * self.scale, -p.y * self.scale)
    }

    /// Per-frame translation that keeps the viewer centred, plus free pan.
    pub fn offset_for(&self, player: Vec2, pan: Vec2) -> Vec2 {
        self.centre() - self.scaled(player) + pan
    }

    /// [`Self::offset_for`] taking both inputs from the frame state.
    pub fn frame_offset(&self, frame: &FrameState) -> Vec2 {
        self.offset_for(frame.pos, frame.pan)
    }

    /// Map point → screen point.
    #[inline]
    pub fn to_screen(&self, p: Vec2, offset: Vec2) -> Vec2 {
        self.scaled(p) + offset
    }

    /// Screen point → map point; inverse of [`Self::to_screen`].
    #[inline]
    pub fn to_map(&self, s: Vec2, offset: Vec2) -> Vec2 {
        let d = s - offset;
        vec2(d.x / self.scale, -d.y / self.scale)
    }

    /// Map length → pixels.
    #[inline]
    pub fn scale_len(&self, len: f32) -> f32 {
        len * self.scale
    }
}
