use bitflags::bitflags;
use glam::{Vec2, vec2};
use thiserror::Error;

pub type LeafId = u16;
pub type LinedefId = u16;
pub type SegmentId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type NodeId = u16;

/// Runtime snapshot of one map (immutable after load).
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    pub name: String,
    pub things: Vec<Thing>,
    pub vertices: Vec<Vertex>,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub segs: Vec<Segment>,
    pub leaves: Vec<Leaf>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
}

/// Failures raised while walking decoded geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{kind} index {index} out of range ({len} present)")]
    InvalidReference {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Debug, PartialEq)]
pub struct Thing {
    pub pos: Vec2,
    pub angle: f32, // degrees, 0 = east, counter-clockwise
    pub type_id: u16,
    pub flags: u16,
}

/// Doom editor number of the player 1 start.
pub const PLAYER1_START: u16 = 1;

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0008;
        const LOWER_UNPEGGED  = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const NOT_ON_MAP      = 0x0080;
        const ALREADY_ON_MAP  = 0x0100;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub special: i16,
    pub tag: i16,
    pub front: Option<SidedefId>,
    pub back: Option<SidedefId>,
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug, PartialEq)]
pub struct Sidedef {
    pub x_off: f32,
    pub y_off: f32,
    pub upper: String,
    pub lower: String,
    pub middle: String,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub v1: VertexId,
    pub v2: VertexId,
    pub angle: i16, // binary angle, 0x4000 = 90°
    pub linedef: LinedefId,
    pub dir: u16, // 0 = same direction as linedef
    pub offset: f32,
}

/// BSP leaf: a convex run of segments (`first_seg .. first_seg + seg_count`).
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub seg_count: u16,
    pub first_seg: SegmentId,
}

/// Axis-aligned box in map units, edges inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub top: i16,
    pub bottom: i16,
    pub left: i16,
    pub right: i16,
}

impl BBox {
    /// Unpack the on-disk 64-bit form:
    /// bits 48–63 right, 32–47 left, 16–31 bottom, 0–15 top.
    pub fn from_packed(packed: i64) -> Self {
        let p = packed as u64;
        Self {
            top: p as u16 as i16,
            bottom: (p >> 16) as u16 as i16,
            left: (p >> 32) as u16 as i16,
            right: (p >> 48) as u16 as i16,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        vec2(self.left as f32, self.bottom as f32)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        vec2(self.right as f32, self.top as f32)
    }
}

/// Child slot of a BSP node, tagged once at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildRef {
    Node(NodeId),
    Leaf(LeafId),
}

impl ChildRef {
    pub const LEAF_BIT: u16 = 0x8000;

    /// Decode the 16-bit on-disk child field (top bit = leaf).
    pub fn from_raw(raw: i16) -> Self {
        let raw = raw as u16;
        if raw & Self::LEAF_BIT != 0 {
            ChildRef::Leaf(raw & !Self::LEAF_BIT)
        } else {
            ChildRef::Node(raw)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// position in `Map::nodes`
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    /// [right, left]
    pub bbox: [BBox; 2],
    /// [right, left]
    pub child: [ChildRef; 2],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sector {
    pub floor_h: f32,
    pub ceil_h: f32,
    pub floor_tex: String,
    pub ceil_tex: String,
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

/*------------------------- checked access ---------------------------*/

fn get<'a, T>(items: &'a [T], kind: &'static str, index: usize) -> Result<&'a T, GeometryError> {
    items.get(index).ok_or(GeometryError::InvalidReference {
        kind,
        index,
        len: items.len(),
    })
}

impl Map {
    /// Root of the BSP (`nodes.len()-1`); a node-less map is one leaf.
    #[inline]
    pub fn bsp_root(&self) -> ChildRef {
        match self.nodes.len() {
            0 => ChildRef::Leaf(0),
            n => ChildRef::Node((n - 1) as NodeId),
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GeometryError> {
        get(&self.nodes, "node", id as usize)
    }

    pub fn leaf(&self, id: LeafId) -> Result<&Leaf, GeometryError> {
        get(&self.leaves, "leaf", id as usize)
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, GeometryError> {
        get(&self.vertices, "vertex", id as usize)
    }

    pub fn linedef(&self, id: LinedefId) -> Result<&Linedef, GeometryError> {
        get(&self.linedefs, "linedef", id as usize)
    }

    /// Segments of leaf `id` as one contiguous slice.
    pub fn segs_of_leaf(&self, id: LeafId) -> Result<&[Segment], GeometryError> {
        let leaf = self.leaf(id)?;
        let start = leaf.first_seg as usize;
        let end = start + leaf.seg_count as usize;
        self.segs.get(start..end).ok_or(GeometryError::InvalidReference {
            kind: "segment",
            index: end.saturating_sub(1),
            len: self.segs.len(),
        })
    }

    /// Both endpoints of a segment.
    pub fn seg_points(&self, seg: &Segment) -> Result<(Vec2, Vec2), GeometryError> {
        Ok((self.vertex(seg.v1)?.pos, self.vertex(seg.v2)?.pos))
    }

    /// Sector a leaf belongs to, via its first segment's linedef side.
    pub fn sector_of_leaf(&self, id: LeafId) -> Result<Option<SectorId>, GeometryError> {
        let Some(seg) = self.segs_of_leaf(id)?.first() else {
            return Ok(None);
        };
        let ld = self.linedef(seg.linedef)?;
        let side = if seg.dir == 0 { ld.front } else { ld.back };
        match side {
            Some(sd) => Ok(Some(get(&self.sidedefs, "sidedef", sd as usize)?.sector)),
            None => Ok(None),
        }
    }

    /// Player 1 start, else the first thing.
    pub fn player_start(&self) -> Option<&Thing> {
        self.things
            .iter()
            .find(|t| t.type_id == PLAYER1_START)
            .or_else(|| self.things.first())
    }
}
