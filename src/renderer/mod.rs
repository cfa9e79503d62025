//! Backend-agnostic 2-D drawing interface.
//!
//! The automap issues a flat, ordered stream of primitives against a
//! [`DrawSurface`]. Window back-ends rasterise them immediately; tests and
//! tools can record them with [`CallList`] instead.

use glam::Vec2;

pub mod automap;
pub mod software;
pub mod viewport;

pub use automap::{AutomapOptions, draw_map};
pub use software::Software;
pub use viewport::{NATIVE_HEIGHT, NATIVE_WIDTH, SCALE_FACTOR, UNITS_PER_STEP, Viewport};

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// One primitive, in screen space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        colour: Rgba,
    },
    Circle {
        centre: Vec2,
        radius: f32,
        colour: Rgba,
    },
    Rect {
        origin: Vec2,
        size: Vec2,
        colour: Rgba,
    },
}

/// Anything that can take the automap's primitives.
pub trait DrawSurface {
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Rgba);

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Rgba);

    /// Outline only; `size` may be negative on either axis.
    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, colour: Rgba);
}

/// Convenience blanket-impl to replay a recorded stream.
pub trait DrawSurfaceExt: DrawSurface {
    fn replay(&mut self, calls: &[DrawCall]) {
        for c in calls {
            match *c {
                DrawCall::Line {
                    from,
                    to,
                    width,
                    colour,
                } => self.draw_line(from, to, width, colour),
                DrawCall::Circle {
                    centre,
                    radius,
                    colour,
                } => self.fill_circle(centre, radius, colour),
                DrawCall::Rect {
                    origin,
                    size,
                    colour,
                } => self.stroke_rect(origin, size, colour),
            }
        }
    }
}
impl<T: DrawSurface + ?Sized> DrawSurfaceExt for T {}

/// Records every call in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallList {
    pub calls: Vec<DrawCall>,
}

impl CallList {
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for CallList {
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Rgba) {
        self.calls.push(DrawCall::Line {
            from,
            to,
            width,
            colour,
        });
    }

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Rgba) {
        self.calls.push(DrawCall::Circle {
            centre,
            radius,
            colour,
        });
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, colour: Rgba) {
        self.calls.push(DrawCall::Rect {
            origin,
            size,
            colour,
        });
    }
}
