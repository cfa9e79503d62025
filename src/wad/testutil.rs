//! In-memory archive builder for unit tests.

use crate::wad::raw::{DIR_ENTRY_SIZE, HEADER_SIZE};

/// Assembles a WAD image: header, lump payloads, then the directory.
pub struct WadBuilder {
    magic: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn new() -> Self {
        Self {
            magic: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            magic: *b"PWAD",
            ..Self::new()
        }
    }

    pub fn lump(mut self, name: &str, data: Vec<u8>) -> Self {
        assert!(name.len() <= 8, "lump name {name} too long");
        self.lumps.push((name.to_owned(), data));
        self
    }

    /// Append a map marker followed by its ten positional lumps.
    pub fn map(self, name: &str, map: &TestMap) -> Self {
        self.lump(name, vec![])
            .lump("THINGS", i16s(map.things.iter().flatten()))
            .lump("LINEDEFS", i16s(map.linedefs.iter().flatten()))
            .lump("SIDEDEFS", map.sidedefs.iter().flat_map(sidedef).collect())
            .lump("VERTEXES", i16s(map.vertices.iter().flatten()))
            .lump("SEGS", i16s(map.segs.iter().flatten()))
            .lump("SSECTORS", i16s(map.leaves.iter().flatten()))
            .lump("NODES", map.nodes.iter().flat_map(TestNode::encode).collect())
            .lump("SECTORS", map.sectors.iter().flat_map(sector).collect())
            .lump("REJECT", vec![])
            .lump("BLOCKMAP", vec![])
    }

    pub fn build(self) -> Vec<u8> {
        let payload: usize = self.lumps.iter().map(|(_, d)| d.len()).sum();
        let dir_offset = HEADER_SIZE + payload;

        let mut out = Vec::with_capacity(dir_offset + self.lumps.len() * DIR_ENTRY_SIZE);
        out.extend_from_slice(&self.magic);
        out.extend(&(self.lumps.len() as i32).to_le_bytes());
        out.extend(&(dir_offset as i32).to_le_bytes());

        let mut dir: Vec<u8> = Vec::new();
        for (name, data) in &self.lumps {
            dir.extend(&(out.len() as i32).to_le_bytes());
            dir.extend(&(data.len() as i32).to_le_bytes());
            dir.extend(&name8(name));
            out.extend(data);
        }
        out.extend(dir);
        out
    }
}

/// Plain record values for one synthetic map.
#[derive(Clone, Debug, Default)]
pub struct TestMap {
    /// x, y, angle, type, flags
    pub things: Vec<[i16; 5]>,
    /// v1, v2, flags, special, tag, front, back
    pub linedefs: Vec<[i16; 7]>,
    pub sidedefs: Vec<TestSidedef>,
    pub vertices: Vec<[i16; 2]>,
    /// v1, v2, angle, linedef, direction, offset
    pub segs: Vec<[i16; 6]>,
    /// seg_count, first_seg
    pub leaves: Vec<[i16; 2]>,
    pub nodes: Vec<TestNode>,
    pub sectors: Vec<TestSector>,
}

#[derive(Clone, Debug)]
pub struct TestSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub upper: &'static str,
    pub lower: &'static str,
    pub middle: &'static str,
    pub sector: i16,
}

#[derive(Clone, Debug)]
pub struct TestNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    /// right, left; each as (top, bottom, left, right)
    pub bbox: [[i16; 4]; 2],
    pub child: [u16; 2],
}

impl TestNode {
    fn encode(&self) -> Vec<u8> {
        let mut out = i16s(&[self.x, self.y, self.dx, self.dy]);
        for [top, bottom, left, right] in self.bbox {
            out.extend(&pack_bbox(top, bottom, left, right).to_le_bytes());
        }
        for c in self.child {
            out.extend(&c.to_le_bytes());
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct TestSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: &'static str,
    pub ceil_tex: &'static str,
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

/// Pack four edges into the 64-bit on-disk form.
pub fn pack_bbox(top: i16, bottom: i16, left: i16, right: i16) -> i64 {
    (((right as u16 as u64) << 48)
        | ((left as u16 as u64) << 32)
        | ((bottom as u16 as u64) << 16)
        | (top as u16 as u64)) as i64
}

pub fn name8(name: &str) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out
}

fn i16s<'a>(vals: impl IntoIterator<Item = &'a i16>) -> Vec<u8> {
    vals.into_iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn sidedef(s: &TestSidedef) -> Vec<u8> {
    let mut out = i16s(&[s.x_off, s.y_off]);
    out.extend(&name8(s.upper));
    out.extend(&name8(s.lower));
    out.extend(&name8(s.middle));
    out.extend(&s.sector.to_le_bytes());
    out
}

fn sector(s: &TestSector) -> Vec<u8> {
    let mut out = i16s(&[s.floor_h, s.ceil_h]);
    out.extend(&name8(s.floor_tex));
    out.extend(&name8(s.ceil_tex));
    out.extend(i16s(&[s.light, s.special, s.tag]));
    out
}

/*──────────────────────────── fixtures ────────────────────────────*/

const LEAF: u16 = 0x8000;

/// 200×200 room split by the vertical line x = 0.
///
/// * leaf 0 = east half (right of the upward partition)
/// * leaf 1 = west half
/// * player 1 start at (50, 0)
pub fn two_leaf_map() -> TestMap {
    TestMap {
        things: vec![[50, 0, 0, 1, 7], [-50, 20, 90, 2001, 7]],
        linedefs: vec![
            [0, 1, 1, 0, 0, 0, -1],
            [1, 2, 1, 0, 0, 1, -1],
            [2, 3, 1, 0, 0, 2, -1],
            [3, 4, 1, 0, 0, 3, -1],
            [4, 5, 1, 0, 0, 4, -1],
            [5, 0, 1, 0, 0, 5, -1],
        ],
        sidedefs: (0..6)
            .map(|_| TestSidedef {
                x_off: 0,
                y_off: 0,
                upper: "-",
                lower: "-",
                middle: "STARTAN3",
                sector: 0,
            })
            .collect(),
        vertices: vec![
            [-100, -100],
            [0, -100],
            [100, -100],
            [100, 100],
            [0, 100],
            [-100, 100],
        ],
        segs: vec![
            [1, 2, 0, 1, 0, 0],
            [2, 3, 16384, 2, 0, 0],
            [3, 4, -32768, 3, 0, 0],
            [4, 5, -32768, 4, 0, 0],
            [5, 0, -16384, 5, 0, 0],
            [0, 1, 0, 0, 0, 0],
        ],
        leaves: vec![[3, 0], [3, 3]],
        nodes: vec![TestNode {
            x: 0,
            y: -100,
            dx: 0,
            dy: 200,
            bbox: [[100, -100, 0, 100], [100, -100, -100, 0]],
            child: [LEAF, LEAF | 1],
        }],
        sectors: vec![TestSector {
            floor_h: 0,
            ceil_h: 128,
            floor_tex: "FLOOR4_8",
            ceil_tex: "CEIL3_5",
            light: 160,
            special: 0,
            tag: 0,
        }],
    }
}

/// Same room cut into quadrants.
///
/// * node 0 splits the east half along y = 0: leaf 0 = SE, leaf 1 = NE
/// * node 1 splits the west half along y = 0: leaf 2 = SW, leaf 3 = NW
/// * node 2 (root) splits x = 0: right = node 0, left = node 1
pub fn quad_map() -> TestMap {
    let mut map = two_leaf_map();
    map.leaves = vec![[1, 0], [1, 1], [1, 2], [1, 3]];
    map.nodes = vec![
        TestNode {
            x: 0,
            y: 0,
            dx: 100,
            dy: 0,
            bbox: [[0, -100, 0, 100], [100, 0, 0, 100]],
            child: [LEAF, LEAF | 1],
        },
        TestNode {
            x: -100,
            y: 0,
            dx: 100,
            dy: 0,
            bbox: [[0, -100, -100, 0], [100, 0, -100, 0]],
            child: [LEAF | 2, LEAF | 3],
        },
        TestNode {
            x: 0,
            y: -100,
            dx: 0,
            dy: 200,
            bbox: [[100, -100, 0, 100], [100, -100, -100, 0]],
            child: [0, 1],
        },
    ];
    map
}

pub fn wad_with(name: &str, map: &TestMap) -> Vec<u8> {
    WadBuilder::new()
        .lump("PLAYPAL", vec![0; 16])
        .map(name, map)
        .build()
}
