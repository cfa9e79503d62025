mod bsp;
mod camera;
mod geometry;

pub use geometry::{
    BBox, ChildRef, GeometryError, Leaf, LeafId, Linedef, LinedefFlags, LinedefId, Map, Node,
    NodeId, PLAYER1_START, Sector, SectorId, Segment, SegmentId, Sidedef, SidedefId, Thing,
    Vertex, VertexId,
};

pub use bsp::{LEFT, RIGHT, angle_to, normalize_deg};

pub use camera::{
    Action, FIELD_OF_VIEW, FrameState, HALF_FOV, InputSource, MOVE_SPEED, PAN_SPEED, TURN_SPEED,
};
