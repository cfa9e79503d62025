//! ----------------------------------------------------------------------------
//! **BSP near-to-far traversal**
//!
//! Responsible for
//! * deciding which side of a partition line the viewer is on
//! * rejecting far subtrees whose bounding box lies outside the field of view
//! * handing every surviving leaf and its segments to a caller-supplied sink
//!
//! Drawing is not done here; see `renderer::automap`.
//! ----------------------------------------------------------------------------

use glam::Vec2;

use super::camera::{FIELD_OF_VIEW, FrameState, HALF_FOV};
use super::{BBox, ChildRef, GeometryError, LeafId, Map, Node, Segment};

/// Child slot indices inside `Node::child` / `Node::bbox`.
pub const RIGHT: usize = 0;
pub const LEFT: usize = 1;

// ──────────────────────────────────────────────────────────────────────────
//                       Map – traversal
// ──────────────────────────────────────────────────────────────────────────
impl Map {
    /// Walk the whole tree from the root for `view`, calling `emit` once per
    /// visible leaf, nearest first.
    pub fn walk_bsp<F>(&self, view: &FrameState, mut emit: F) -> Result<(), GeometryError>
    where
        F: FnMut(LeafId, &[Segment]),
    {
        self.walk_from(self.bsp_root(), view, &mut emit, 0)
    }

    /// Collect visible leaves into `leaves` (cleared first), nearest first.
    pub fn fill_visible_leaves(
        &self,
        view: &FrameState,
        leaves: &mut Vec<LeafId>,
    ) -> Result<(), GeometryError> {
        leaves.clear();
        self.walk_bsp(view, |leaf, _| leaves.push(leaf))
    }

    /// Recursive step starting at an arbitrary child reference.
    pub fn walk_from<F>(
        &self,
        child: ChildRef,
        view: &FrameState,
        emit: &mut F,
        depth: usize,
    ) -> Result<(), GeometryError>
    where
        F: FnMut(LeafId, &[Segment]),
    {
        let id = match child {
            ChildRef::Leaf(leaf) => {
                emit(leaf, self.segs_of_leaf(leaf)?);
                return Ok(());
            }
            ChildRef::Node(id) => id,
        };

        // a well-formed tree is never deeper than its node count
        if depth > self.nodes.len() {
            return Err(GeometryError::Invariant(format!(
                "BSP recursion deeper than {} nodes at node {id}; tree has a cycle",
                self.nodes.len()
            )));
        }

        // Internal node ──────
        let node = self.node(id)?;
        let near = if node.point_on_left(view.pos) { LEFT } else { RIGHT };
        let far = near ^ 1;

        // Near side first …
        self.walk_from(node.child[near], view, emit, depth + 1)?;

        // … far side only if its bounding box might be visible.
        if node.bbox[far].visible_from(view.pos, view.angle)? {
            self.walk_from(node.child[far], view, emit, depth + 1)?;
        }
        Ok(())
    }

    /// Walk the BSP and return the leaf containing `p`.
    pub fn locate_leaf(&self, p: Vec2) -> Result<LeafId, GeometryError> {
        let mut child = self.bsp_root();
        for _ in 0..=self.nodes.len() {
            match child {
                ChildRef::Leaf(leaf) => return Ok(leaf),
                ChildRef::Node(id) => {
                    let node = self.node(id)?;
                    child = node.child[node.point_on_left(p) as usize];
                }
            }
        }
        Err(GeometryError::Invariant(
            "leaf lookup did not terminate; tree has a cycle".into(),
        ))
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// `true` when `p` is on the left of the partition (or on the line).
    ///
    /// Sign of `(p - origin) × (dx, dy)`; non-positive means left.
    #[inline(always)]
    pub fn point_on_left(&self, p: Vec2) -> bool {
        let cross = (p.x - self.x) * self.dy - (p.y - self.y) * self.dx;
        cross <= 0.0
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       BBox visibility
// ──────────────────────────────────────────────────────────────────────────

/// Position of the viewer along one axis of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Span {
    Below,
    Inside,
    Above,
}

fn classify(v: f32, lo: f32, hi: f32) -> Option<Span> {
    if v < lo {
        Some(Span::Below)
    } else if v > hi {
        Some(Span::Above)
    } else if v >= lo && v <= hi {
        Some(Span::Inside)
    } else {
        None // NaN
    }
}

/// Wrap degrees into [0, 360).
#[inline]
pub fn normalize_deg(a: f32) -> f32 {
    let a = a.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/// Angle of `to` seen from `from`, degrees in [0, 360).
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    normalize_deg(d.y.atan2(d.x).to_degrees())
}

impl BBox {
    /// The two corners outlining the box as seen from `pos`, counter-clockwise
    /// one first. `None` when `pos` is inside the box.
    fn silhouette(&self, pos: Vec2) -> Result<Option<(Vec2, Vec2)>, GeometryError> {
        if self.left > self.right || self.bottom > self.top {
            return Err(GeometryError::Invariant(format!(
                "inverted bounding box {self:?}"
            )));
        }
        let (min, max) = (self.min(), self.max());
        let (Some(sx), Some(sy)) = (classify(pos.x, min.x, max.x), classify(pos.y, min.y, max.y))
        else {
            return Err(GeometryError::Invariant(format!(
                "cannot place viewer {pos} against box {self:?}"
            )));
        };

        let (l, r, b, t) = (min.x, max.x, min.y, max.y);
        let pair = |x1: f32, y1: f32, x2: f32, y2: f32| {
            Some((Vec2::new(x1, y1), Vec2::new(x2, y2)))
        };

        Ok(match (sx, sy) {
            (Span::Below, Span::Above) => pair(r, t, l, b),
            (Span::Inside, Span::Above) => pair(r, t, l, t),
            (Span::Above, Span::Above) => pair(r, b, l, t),
            (Span::Below, Span::Inside) => pair(l, t, l, b),
            (Span::Inside, Span::Inside) => None,
            (Span::Above, Span::Inside) => pair(r, b, r, t),
            (Span::Below, Span::Below) => pair(l, t, r, b),
            (Span::Inside, Span::Below) => pair(l, b, r, b),
            (Span::Above, Span::Below) => pair(l, b, r, t),
        })
    }

    /// Whether any part of the box falls inside the ±45° cone around
    /// `angle` (degrees, 0 = east, counter-clockwise) as seen from `pos`.
    ///
    /// A viewer inside the box always sees it. An inverted box or a
    /// non-finite position is reported as `GeometryError::Invariant`.
    pub fn visible_from(&self, pos: Vec2, angle: f32) -> Result<bool, GeometryError> {
        let Some((c1, c2)) = self.silhouette(pos)? else {
            return Ok(true);
        };

        let a1 = angle_to(pos, c1);
        let a2 = angle_to(pos, c2);
        let span = normalize_deg(a1 - a2);

        // viewer sits on an edge: the box wraps around it
        if span >= 180.0 {
            return Ok(true);
        }

        // left (counter-clockwise) corner beyond the left edge of the cone?
        let t = normalize_deg(a1 - angle + HALF_FOV);
        if t > FIELD_OF_VIEW && t - FIELD_OF_VIEW >= span {
            return Ok(false);
        }

        // right corner beyond the right edge of the cone?
        let t = normalize_deg(HALF_FOV - (a2 - angle));
        if t > FIELD_OF_VIEW && t - FIELD_OF_VIEW >= span {
            return Ok(false);
        }

        Ok(true)
    }
}
