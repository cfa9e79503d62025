//! ---------------------------------------------------------------------------
//! Software (CPU) frame-buffer back-end
//!
//! * Fills a `Vec<u32>` in **0x00RRGGBB** format.
//! * Everything is clipped against the buffer; off-screen geometry is fine.
//! * Primitives land in submission order, so later calls paint over earlier
//!   ones.
//! ---------------------------------------------------------------------------

use glam::Vec2;

use crate::renderer::{DrawSurface, Rgba};

/// Colour the frame is cleared to.
pub const CLEAR_COLOUR: Rgba = 0x00_000000;

#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

impl Software {
    /// (Re)allocate for the requested resolution and clear.
    pub fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, CLEAR_COLOUR);
        }
        self.scratch.fill(CLEAR_COLOUR);
    }

    /// Finish the frame and **loan** the buffer to `submit`.
    pub fn end_frame<F, R>(&mut self, submit: F) -> R
    where
        F: FnOnce(&[Rgba], usize, usize) -> R,
    {
        submit(&self.scratch, self.width, self.height)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.scratch[i])
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, col: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.scratch[i] = col;
        }
    }

    /// Square brush of `half` pixels around (x, y).
    fn stamp(&mut self, x: i32, y: i32, half: i32, col: Rgba) {
        for dy in -half..=half {
            for dx in -half..=half {
                self.plot(x + dx, y + dy, col);
            }
        }
    }

    /// Integer Bresenham line-drawing algorithm.
    fn bresenham(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, half: i32, col: Rgba) {
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.stamp(x0, y0, half, col);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Round into pixel space, saturating far-off coordinates.
#[inline]
fn px(v: f32) -> i32 {
    v.round() as i32
}

/// Bresenham on huge coordinates would walk millions of off-screen pixels;
/// keep endpoints within a generous band around the buffer.
fn clamp_far(v: f32, extent: usize) -> f32 {
    let margin = extent as f32 * 4.0 + 64.0;
    v.clamp(-margin, margin)
}

impl DrawSurface for Software {
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Rgba) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let half = ((width - 1.0) * 0.5).round().max(0.0) as i32;
        let (w, h) = (self.width, self.height);
        self.bresenham(
            px(clamp_far(from.x, w)),
            px(clamp_far(from.y, h)),
            px(clamp_far(to.x, w)),
            px(clamp_far(to.y, h)),
            half,
            colour,
        );
    }

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Rgba) {
        if !centre.is_finite() || radius < 0.0 {
            return;
        }
        let r = radius.ceil() as i32;
        let (cx, cy) = (px(centre.x), px(centre.y));
        let r2 = radius * radius;
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f32 <= r2 {
                    self.plot(cx + dx, cy + dy, colour);
                }
            }
        }
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, colour: Rgba) {
        let a = origin;
        let b = origin + size;
        let corners = [
            a,
            Vec2::new(b.x, a.y),
            b,
            Vec2::new(a.x, b.y),
        ];
        for i in 0..4 {
            self.draw_line(corners[i], corners[(i + 1) % 4], 1.0, colour);
        }
    }
}
