// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  *   RawLevel   (wad::level)   ───>   world::Map
//
//  Packed boxes and tagged child references are decoded here, once, so the
//  traversal never touches the on-disk encoding.
// ──────────────────────────────────────────────────────────────────────────

use crate::{
    wad::level::{self as raw_level, LevelError},
    wad::raw::{Wad, WadError},
    world::{
        BBox, ChildRef, Leaf, Linedef, LinedefFlags, Map, Node, NodeId, Sector, Segment, Sidedef,
        Thing, Vertex,
    },
};
use glam::vec2;
use log::info;
use thiserror::Error;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Load map `name` (e.g. `E1M1`) into a `world::Map`.
pub fn load_map(wad: &Wad, name: &str) -> Result<Map, LoadError> {
    let marker = wad.find_map(name)?;
    load_level(wad, marker)
}

/// Load the map whose marker sits at directory position `marker`.
pub fn load_level(wad: &Wad, marker: usize) -> Result<Map, LoadError> {
    let raw = wad.parse_level(marker)?;

    let map = Map {
        things: raw.things.iter().map(convert_thing).collect(),
        vertices: raw
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: vec2(v.x as f32, v.y as f32),
            })
            .collect(),
        linedefs: raw.linedefs.iter().map(convert_linedef).collect(),
        sidedefs: raw.sidedefs.iter().map(convert_sidedef).collect(),
        segs: raw.segs.iter().map(convert_seg).collect(),
        leaves: raw
            .subsectors
            .iter()
            .map(|s| Leaf {
                seg_count: s.seg_count as u16,
                first_seg: s.first_seg as u16,
            })
            .collect(),
        nodes: raw
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| convert_node(i as NodeId, n))
            .collect(),
        sectors: raw.sectors.iter().map(convert_sector).collect(),
        name: raw.name,
    };

    info!(
        "map {}: {} linedefs, {} leaves, {} nodes",
        map.name,
        map.linedefs.len(),
        map.leaves.len(),
        map.nodes.len()
    );
    Ok(map)
}

/*====================================================================*/
/*                       Record conversion                            */
/*====================================================================*/

fn convert_thing(t: &raw_level::RawThing) -> Thing {
    Thing {
        pos: vec2(t.x as f32, t.y as f32),
        angle: t.angle as f32,
        type_id: t.type_ as u16,
        flags: t.flags as u16,
    }
}

/// `-1` (0xFFFF) marks a missing side.
fn side_ref(raw: i16) -> Option<u16> {
    match raw {
        -1 => None,
        s => Some(s as u16),
    }
}

fn convert_linedef(l: &raw_level::RawLinedef) -> Linedef {
    Linedef {
        v1: l.v1 as u16,
        v2: l.v2 as u16,
        flags: LinedefFlags::from_bits_retain(l.flags as u16),
        special: l.special,
        tag: l.tag,
        front: side_ref(l.sidenum[0]),
        back: side_ref(l.sidenum[1]),
    }
}

fn convert_sidedef(s: &raw_level::RawSidedef) -> Sidedef {
    Sidedef {
        x_off: s.x_off as f32,
        y_off: s.y_off as f32,
        upper: Wad::lump_name_str(&s.top_tex).into_owned(),
        lower: Wad::lump_name_str(&s.bottom_tex).into_owned(),
        middle: Wad::lump_name_str(&s.mid_tex).into_owned(),
        sector: s.sector as u16,
    }
}

fn convert_seg(s: &raw_level::RawSeg) -> Segment {
    Segment {
        v1: s.v1 as u16,
        v2: s.v2 as u16,
        angle: s.angle,
        linedef: s.linedef as u16,
        dir: s.side as u16,
        offset: s.offset as f32,
    }
}

fn convert_node(id: NodeId, n: &raw_level::RawNode) -> Node {
    Node {
        id,
        x: n.x as f32,
        y: n.y as f32,
        dx: n.dx as f32,
        dy: n.dy as f32,
        bbox: n.bbox.map(BBox::from_packed),
        child: n.child.map(ChildRef::from_raw),
    }
}

fn convert_sector(s: &raw_level::RawSector) -> Sector {
    Sector {
        floor_h: s.floor_h as f32,
        ceil_h: s.ceil_h as f32,
        floor_tex: Wad::lump_name_str(&s.floor_tex).into_owned(),
        ceil_tex: Wad::lump_name_str(&s.ceil_tex).into_owned(),
        light: s.light,
        special: s.special,
        tag: s.tag,
    }
}

/*====================================================================*/
/*                                Tests                               */
/*====================================================================*/
