//! ---------------------------------------------------------------------------
//! Top-down map frame
//!
//! Draw order, back to front:
//! 1. every linedef (grey)
//! 2. things (small grey dots)
//! 3. node bounding boxes (debug only)
//! 4. segments of BSP-visible leaves, nearest first, red fading with rank
//! 5. the player and the two edges of the view cone
//! ---------------------------------------------------------------------------

use glam::{Vec2, vec2};

use crate::{
    renderer::{DrawSurface, Rgba, Viewport},
    world::{FrameState, GeometryError, HALF_FOV, Map},
};

const LINEDEF_COLOUR: Rgba = 0x00_808080;
const THING_COLOUR: Rgba = 0x00_808080;
const BBOX_COLOUR: Rgba = 0x00_800000;
const PLAYER_COLOUR: Rgba = 0x00_FF0000;
const FOV_COLOUR: Rgba = 0x00_808000;

const LINEDEF_WIDTH: f32 = 2.0;
const LEAF_WIDTH: f32 = 3.0;
const FOV_WIDTH: f32 = 1.0;
const THING_RADIUS: f32 = 2.0;
const PLAYER_RADIUS: f32 = 4.0;

/// Red channel drop per traversal rank, and the floor it stops at.
const FADE_STEP: u32 = 8;
const FADE_MIN: u32 = 64;

/// Debug toggles for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutomapOptions {
    pub show_bboxes: bool,
    pub show_things: bool,
    /// length of the view-cone edges in pixels
    pub fov_ray_len: f32,
}

impl Default for AutomapOptions {
    fn default() -> Self {
        Self {
            show_bboxes: false,
            show_things: true,
            fov_ray_len: 100.0,
        }
    }
}

/// Colour of the `rank`-th visible leaf (0 = nearest).
pub fn leaf_colour(rank: usize) -> Rgba {
    let fade = (rank as u32).saturating_mul(FADE_STEP);
    let red = 255u32.saturating_sub(fade).max(FADE_MIN);
    red << 16
}

/// Issue the whole frame against `surface`.
///
/// `frame` must already hold this frame's input.
pub fn draw_map<S: DrawSurface + ?Sized>(
    surface: &mut S,
    map: &Map,
    frame: &FrameState,
    vp: &Viewport,
    opts: &AutomapOptions,
) -> Result<(), GeometryError> {
    let offset = vp.frame_offset(frame);
    let screen = |p: Vec2| vp.to_screen(p, offset);

    /*--- linedefs -----------------------------------------------*/
    for ld in &map.linedefs {
        let a = map.vertex(ld.v1)?.pos;
        let b = map.vertex(ld.v2)?.pos;
        surface.draw_line(screen(a), screen(b), LINEDEF_WIDTH, LINEDEF_COLOUR);
    }

    /*--- things -------------------------------------------------*/
    if opts.show_things {
        for t in &map.things {
            surface.fill_circle(screen(t.pos), THING_RADIUS, THING_COLOUR);
        }
    }

    /*--- node boxes ---------------------------------------------*/
    if opts.show_bboxes {
        for node in &map.nodes {
            for bb in &node.bbox {
                let origin = screen(vec2(bb.left as f32, bb.top as f32));
                // widen first: a legal box can span more than i16::MAX
                let size = vec2(
                    vp.scale_len(bb.right as f32 - bb.left as f32),
                    vp.scale_len(bb.top as f32 - bb.bottom as f32),
                );
                surface.stroke_rect(origin, size, BBOX_COLOUR);
            }
        }
    }

    /*--- visible leaves -----------------------------------------*/
    // the sink cannot return errors; keep the first one and raise it after the walk
    let mut visible: Vec<(usize, Vec2, Vec2)> = Vec::new();
    let mut rank = 0usize;
    let mut failed = None;
    map.walk_bsp(frame, |_, segs| {
        for seg in segs {
            match map.seg_points(seg) {
                Ok((a, b)) => visible.push((rank, a, b)),
                Err(e) => {
                    failed.get_or_insert(e);
                }
            }
        }
        rank += 1;
    })?;
    if let Some(e) = failed {
        return Err(e);
    }
    for (rank, a, b) in visible {
        surface.draw_line(screen(a), screen(b), LEAF_WIDTH, leaf_colour(rank));
    }

    /*--- player & view cone -------------------------------------*/
    let eye = screen(frame.pos);
    surface.fill_circle(eye, PLAYER_RADIUS, PLAYER_COLOUR);
    for edge in [frame.angle + HALF_FOV, frame.angle - HALF_FOV] {
        let (s, c) = edge.to_radians().sin_cos();
        let tip = eye + vec2(c, -s) * opts.fov_ray_len;
        surface.draw_line(eye, tip, FOV_WIDTH, FOV_COLOUR);
    }

    Ok(())
}
