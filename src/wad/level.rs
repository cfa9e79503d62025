use crate::wad::{LumpRecord, Wad, WadError};
use bincode::Decode;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/*=======================================================================*/
/*                         Raw binary structs                            */
/*=======================================================================*/

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawThing {
    pub x: i16,
    pub y: i16,
    pub angle: i16,
    pub type_: i16,
    pub flags: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawLinedef {
    pub v1: i16,
    pub v2: i16,
    pub flags: i16,
    pub special: i16,
    pub tag: i16,
    /// front (right), back (left); -1 = none
    pub sidenum: [i16; 2],
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub top_tex: [u8; 8],
    pub bottom_tex: [u8; 8],
    pub mid_tex: [u8; 8],
    pub sector: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawSeg {
    pub v1: i16,
    pub v2: i16,
    pub angle: i16,
    pub linedef: i16,
    pub side: i16,
    pub offset: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawSubsector {
    pub seg_count: i16,
    pub first_seg: i16,
}

/// `bbox` holds the right and left boxes in their packed 64-bit form.
#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub bbox: [i64; 2],
    pub child: [i16; 2],
}

#[derive(Clone, Copy, Decode, Debug, PartialEq)]
pub struct RawSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: [u8; 8],
    pub ceil_tex: [u8; 8],
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

impl LumpRecord for RawThing {
    const SIZE: usize = 10;
}
impl LumpRecord for RawLinedef {
    const SIZE: usize = 14;
}
impl LumpRecord for RawSidedef {
    const SIZE: usize = 30;
}
impl LumpRecord for RawVertex {
    const SIZE: usize = 4;
}
impl LumpRecord for RawSeg {
    const SIZE: usize = 12;
}
impl LumpRecord for RawSubsector {
    const SIZE: usize = 4;
}
impl LumpRecord for RawNode {
    const SIZE: usize = 28;
}
impl LumpRecord for RawSector {
    const SIZE: usize = 26;
}

/*=======================================================================*/
/*                     Aggregate returned by `parse_level`               */
/*=======================================================================*/
#[derive(Debug, PartialEq)]
pub struct RawLevel {
    pub name: String,
    pub things: Vec<RawThing>,
    pub linedefs: Vec<RawLinedef>,
    pub sidedefs: Vec<RawSidedef>,
    pub vertices: Vec<RawVertex>,
    pub segs: Vec<RawSeg>,
    pub subsectors: Vec<RawSubsector>,
    pub nodes: Vec<RawNode>,
    pub sectors: Vec<RawSector>,
}

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("map `{0}` not found in directory")]
    MapNotFound(String),

    #[error("marker index {0} out of bounds")]
    MarkerOob(usize),

    #[error("expected lump `{0}` not found after level marker")]
    Missing(&'static str),

    #[error(transparent)]
    Wad(#[from] WadError),
}

/*=======================================================================*/
/*                     Convenience helpers on `Wad`                      */
/*=======================================================================*/
impl Wad {
    /// Return directory indices of every map marker (`E#M#`, `MAP##`).
    pub fn level_indices(&self) -> Vec<usize> {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(E[1-4]M[1-9]|MAP[0-3][0-9])$").expect("static map-name pattern")
        });

        self.lumps()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.size == 0 && RE.is_match(&Self::lump_name_str(&l.name)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Directory position of the marker lump for map `name`.
    pub fn find_map(&self, name: &str) -> Result<usize, LevelError> {
        self.find_lump(name)
            .ok_or_else(|| LevelError::MapNotFound(name.to_owned()))
    }

    /// Return `idx` if the lump there is called `name`.
    fn idx_of(&self, idx: usize, name: &'static str) -> Result<usize, LevelError> {
        let l = self.lumps().get(idx).ok_or(LevelError::Missing(name))?;
        match Self::lump_name_str(&l.name) == name {
            true => Ok(idx),
            false => Err(LevelError::Missing(name)),
        }
    }

    /// Decode the eight lumps that follow a map marker.
    pub fn parse_level(&self, marker_idx: usize) -> Result<RawLevel, LevelError> {
        // --- bounds check on marker index --------------------------------
        if marker_idx >= self.lumps().len() {
            return Err(LevelError::MarkerOob(marker_idx));
        }

        // --- fixed lump order after marker -------------------------------
        let things_idx = self.idx_of(marker_idx + 1, "THINGS")?;
        let linedefs_idx = self.idx_of(marker_idx + 2, "LINEDEFS")?;
        let sidedefs_idx = self.idx_of(marker_idx + 3, "SIDEDEFS")?;
        let vertices_idx = self.idx_of(marker_idx + 4, "VERTEXES")?;
        let segs_idx = self.idx_of(marker_idx + 5, "SEGS")?;
        let ssectors_idx = self.idx_of(marker_idx + 6, "SSECTORS")?;
        let nodes_idx = self.idx_of(marker_idx + 7, "NODES")?;
        let sectors_idx = self.idx_of(marker_idx + 8, "SECTORS")?;
        // REJECT / BLOCKMAP are not consumed

        // --- decode each lump -------------------------------------------
        let lvl = RawLevel {
            name: self.lump_name(marker_idx).into(),
            things: self.lump_to_vec(things_idx)?,
            linedefs: self.lump_to_vec(linedefs_idx)?,
            sidedefs: self.lump_to_vec(sidedefs_idx)?,
            vertices: self.lump_to_vec(vertices_idx)?,
            segs: self.lump_to_vec(segs_idx)?,
            subsectors: self.lump_to_vec(ssectors_idx)?,
            nodes: self.lump_to_vec(nodes_idx)?,
            sectors: self.lump_to_vec(sectors_idx)?,
        };

        debug!(
            "{}: {} vertices, {} linedefs, {} segs, {} subsectors, {} nodes, {} sectors",
            lvl.name,
            lvl.vertices.len(),
            lvl.linedefs.len(),
            lvl.segs.len(),
            lvl.subsectors.len(),
            lvl.nodes.len(),
            lvl.sectors.len()
        );
        Ok(lvl)
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
