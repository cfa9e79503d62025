use glam::{Vec2, vec2};

use super::Map;

/// Horizontal field of view in degrees.
pub const FIELD_OF_VIEW: f32 = 90.0;
pub const HALF_FOV: f32 = FIELD_OF_VIEW / 2.0;

/// Degrees turned per frame while a turn key is held.
pub const TURN_SPEED: f32 = 2.0;
/// Map units walked per frame.
pub const MOVE_SPEED: f32 = 2.0;
/// Screen pixels panned per frame.
pub const PAN_SPEED: f32 = 2.0;

/// Facing used when a map has no things to spawn from.
const DEFAULT_ANGLE: f32 = 180.0;

/// Everything the traversal and the coordinate mapper need to know about
/// the viewer for one frame.
///
/// * `angle` is in degrees, 0 = east, counter-clockwise.
/// * `pan` is a free screen-space offset, independent of `pos`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub pos: Vec2,
    pub angle: f32,
    pub pan: Vec2,
}

/// Held-key actions understood by [`FrameState::apply_input`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
}

/// Polled once per frame by the outer loop.
pub trait InputSource {
    fn is_held(&self, action: Action) -> bool;
}

impl FrameState {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle: angle.rem_euclid(360.0),
            pan: Vec2::ZERO,
        }
    }

    /// Spawn on the map's player start, facing the way the thing faces.
    pub fn spawn(map: &Map) -> Self {
        match map.player_start() {
            Some(t) => Self::new(t.pos, t.angle),
            None => Self::new(Vec2::ZERO, DEFAULT_ANGLE),
        }
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the viewer looks, in map space.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.angle.to_radians().sin_cos();
        vec2(c, s)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move `dist` map units along the facing direction.
    pub fn step(&mut self, dist: f32) {
        self.pos += self.forward() * dist;
    }

    /// Rotate (positive = turn left).
    pub fn turn(&mut self, delta: f32) {
        self.angle = (self.angle + delta).rem_euclid(360.0);
    }

    /// Apply one frame of held keys. Call before traversing the frame.
    pub fn apply_input<I: InputSource + ?Sized>(&mut self, input: &I) {
        if input.is_held(Action::TurnLeft) {
            self.turn(TURN_SPEED);
        }
        if input.is_held(Action::TurnRight) {
            self.turn(-TURN_SPEED);
        }
        if input.is_held(Action::Forward) {
            self.step(MOVE_SPEED);
        }
        if input.is_held(Action::Backward) {
            self.step(-MOVE_SPEED);
        }
        if input.is_held(Action::PanUp) {
            self.pan.y += PAN_SPEED;
        }
        if input.is_held(Action::PanDown) {
            self.pan.y -= PAN_SPEED;
        }
        if input.is_held(Action::PanLeft) {
            self.pan.x += PAN_SPEED;
        }
        if input.is_held(Action::PanRight) {
            self.pan.x -= PAN_SPEED;
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
