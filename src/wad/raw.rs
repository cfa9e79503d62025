//! # WAD archive reader
//!
//! * Reads the entire archive into RAM.
//! * Provides zero-copy access to individual lumps.
//! * Decodes fixed-size binary records into typed vectors with **bincode 2**.
//!
//! Both `IWAD` and `PWAD` magics are accepted.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::{debug, info, warn};
use std::{
    borrow::Cow,
    collections::HashMap,
    fs,
    io::{self, Read},
    path::Path,
};
use thiserror::Error;

/// Size of the fixed header at the start of the file.
pub const HEADER_SIZE: usize = 12;

/// Size (in bytes) of one directory entry.
pub const DIR_ENTRY_SIZE: usize = 16;

/// One entry in the lump directory (16 bytes on disk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub name: [u8; 8],
    pub offset: i32,
    pub size: i32,
}

/// Parsed 12-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WadHeader {
    pub magic: [u8; 4],
    pub num_lumps: i32,
    pub dir_offset: i32,
}

/// Entire WAD in memory (raw bytes + parsed directory).
#[derive(Debug)]
pub struct Wad {
    header: WadHeader,
    lumps: Vec<LumpInfo>,
    bytes: Vec<u8>,
    by_name: HashMap<String, usize>,
}

/// A fixed-size little-endian record stored back to back inside a lump.
///
/// `SIZE` is the on-disk stride, which is not `mem::size_of::<Self>()` once
/// fields of different widths are mixed.
pub trait LumpRecord: Decode<()> {
    const SIZE: usize;
}

/// Loader / decoding errors.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad magic {0:?}, expected IWAD or PWAD")]
    BadMagic([u8; 4]),

    #[error("directory offset {offset} outside file of {file_size} bytes")]
    DirectoryOutOfBounds { offset: i32, file_size: usize },

    #[error("lump index {0} out of range")]
    BadIndex(usize),

    #[error("lump {name} (# {index}) slice {offset}+{size} past EOF ({file_size})")]
    BadOffset {
        index: usize,
        name: String,
        offset: i32,
        size: i32,
        file_size: usize,
    },

    #[error("lump {name} (# {index}) size {size} not multiple of record size {elem_size}")]
    BadLumpSize {
        index: usize,
        name: String,
        size: usize,
        elem_size: usize,
    },

    #[error("lump {name} (# {index}) record {elem}: {source}")]
    BadElement {
        index: usize,
        name: String,
        elem: usize,
        source: bincode::error::DecodeError,
    },
}

impl Wad {
    // ------------------------------------------------------------------ //
    // Low-level helpers
    // ------------------------------------------------------------------ //

    pub fn header(&self) -> &WadHeader {
        &self.header
    }

    /// Expose directory as a read-only slice, in file order.
    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// Text of an 8-byte lump name, trimmed at the first NUL; bytes that are
    /// not UTF-8 become U+FFFD.
    pub fn lump_name_str(name: &[u8; 8]) -> Cow<'_, str> {
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        String::from_utf8_lossy(&name[..end])
    }

    /// Printable name of lump `idx`, or `"?"` when out of range.
    pub fn lump_name(&self, idx: usize) -> Cow<'_, str> {
        self.lumps
            .get(idx)
            .map_or(Cow::Borrowed("?"), |l| Self::lump_name_str(&l.name))
    }

    /// Raw bytes of lump `idx` (slice into `self.bytes`).
    pub fn lump_bytes(&self, idx: usize) -> Result<&[u8], WadError> {
        let l = self.lumps.get(idx).ok_or(WadError::BadIndex(idx))?;
        let bad_offset = || WadError::BadOffset {
            index: idx,
            name: Self::lump_name_str(&l.name).into(),
            offset: l.offset,
            size: l.size,
            file_size: self.bytes.len(),
        };
        let start = usize::try_from(l.offset).map_err(|_| bad_offset())?;
        let len = usize::try_from(l.size).map_err(|_| bad_offset())?;
        let end = start.checked_add(len).ok_or_else(bad_offset)?;
        if end > self.bytes.len() {
            return Err(bad_offset());
        }
        Ok(&self.bytes[start..end])
    }

    /// Find the last lump with `name` (case-sensitive like vanilla Doom).
    pub fn find_lump(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    // ------------------------------------------------------------------ //
    // Generic decode helper
    // ------------------------------------------------------------------ //

    /// Decode lump `idx` as a packed array of `T`.
    pub fn lump_to_vec<T: LumpRecord>(&self, idx: usize) -> Result<Vec<T>, WadError> {
        let bytes = self.lump_bytes(idx)?;

        if bytes.len() % T::SIZE != 0 {
            return Err(WadError::BadLumpSize {
                index: idx,
                name: self.lump_name(idx).into(),
                size: bytes.len(),
                elem_size: T::SIZE,
            });
        }

        let cfg = config::standard()
            .with_fixed_int_encoding()
            .with_little_endian();
        let mut out = Vec::with_capacity(bytes.len() / T::SIZE);

        for (elem, chunk) in bytes.chunks_exact(T::SIZE).enumerate() {
            let (val, _) =
                decode_from_slice::<T, _>(chunk, cfg).map_err(|e| WadError::BadElement {
                    index: idx,
                    name: self.lump_name(idx).into(),
                    elem,
                    source: e,
                })?;
            out.push(val);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------ //
    // Loading
    // ------------------------------------------------------------------ //

    /// Load a WAD from disk into memory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WadError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        info!("loaded {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(bytes)
    }

    /// Parse an archive image that is already resident in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WadError> {
        let mut cur = bytes.as_slice();

        let mut magic = [0u8; 4];
        cur.read_exact(&mut magic)?;
        if &magic != b"IWAD" && &magic != b"PWAD" {
            return Err(WadError::BadMagic(magic));
        }

        let num_lumps = cur.read_i32::<LE>()?;
        let dir_offset = cur.read_i32::<LE>()?;
        let header = WadHeader {
            magic,
            num_lumps,
            dir_offset,
        };

        let dir_start = usize::try_from(dir_offset)
            .ok()
            .filter(|&o| o >= HEADER_SIZE && o <= bytes.len())
            .ok_or(WadError::DirectoryOutOfBounds {
                offset: dir_offset,
                file_size: bytes.len(),
            })?;

        // walk 16-byte records until fewer than 16 bytes remain; an entry
        // ending exactly at EOF is still read, so the last lump is kept
        let mut lumps = Vec::with_capacity(num_lumps.max(0) as usize);
        let mut cur = &bytes[dir_start..];
        while cur.len() >= DIR_ENTRY_SIZE {
            let offset = cur.read_i32::<LE>()?;
            let size = cur.read_i32::<LE>()?;
            let mut name = [0u8; 8];
            cur.read_exact(&mut name)?;
            lumps.push(LumpInfo { name, offset, size });
        }

        if lumps.len() != num_lumps.max(0) as usize {
            warn!(
                "header announces {num_lumps} lumps, directory holds {}",
                lumps.len()
            );
        }

        // build name → idx map (later lumps shadow earlier ones)
        let mut by_name = HashMap::with_capacity(lumps.len());
        for (i, l) in lumps.iter().enumerate().rev() {
            by_name
                .entry(Self::lump_name_str(&l.name).into_owned())
                .or_insert(i);
        }

        debug!(
            "{} directory: {} entries at offset {dir_offset}",
            String::from_utf8_lossy(&magic),
            lumps.len()
        );

        Ok(Self {
            header,
            lumps,
            bytes,
            by_name,
        })
    }
}

// ==========================================================================
// Tests
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wad::testutil::WadBuilder;

    #[test]
    fn reads_header_and_directory() {
        let bytes = WadBuilder::new()
            .lump("PLAYPAL", vec![1, 2, 3])
            .lump("COLORMAP", vec![4; 10])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();

        assert_eq!(&wad.header().magic, b"IWAD");
        assert_eq!(wad.header().num_lumps, 2);
        assert_eq!(wad.lumps().len(), 2);
        assert_eq!(wad.lump_name(0), "PLAYPAL");
        assert_eq!(wad.lump_name(1), "COLORMAP");
    }

    #[test]
    fn pwad_magic_accepted() {
        let bytes = WadBuilder::pwad().lump("DEMO1", vec![0; 4]).build();
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(&wad.header().magic, b"PWAD");
    }

    #[test]
    fn find_lump_by_name() {
        let bytes = WadBuilder::new()
            .lump("A", vec![])
            .lump("TITLEPIC", vec![9; 7])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();
        let idx = wad.find_lump("TITLEPIC").expect("TITLEPIC not found");
        assert_eq!(idx, 1);
        assert_eq!(wad.lump_bytes(idx).unwrap(), &[9; 7]);
        assert!(wad.find_lump("MISSING").is_none());
    }

    #[test]
    fn later_lumps_shadow_earlier_ones() {
        let bytes = WadBuilder::new()
            .lump("DUP", vec![1])
            .lump("DUP", vec![2])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.find_lump("DUP"), Some(1));
    }

    #[test]
    fn non_utf8_names_do_not_collide() {
        let mut bytes = WadBuilder::new()
            .lump("AAA", vec![1])
            .lump("BBB", vec![2])
            .build();
        // directory starts after the 2 payload bytes; names sit 8 bytes in
        let dir = HEADER_SIZE + 2;
        bytes[dir + 8] = 0xFF;
        bytes[dir + DIR_ENTRY_SIZE + 8] = 0xFE;

        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.lump_name(0), "\u{FFFD}AA");
        assert_eq!(wad.find_lump("\u{FFFD}AA"), Some(0));
        assert_eq!(wad.find_lump("\u{FFFD}BB"), Some(1));
    }

    #[test]
    fn directory_entry_ending_at_eof_is_kept() {
        let bytes = WadBuilder::new()
            .lump("ONE", vec![1])
            .lump("LAST", vec![2, 3])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.lumps().len(), 2);
        assert_eq!(wad.find_lump("LAST"), Some(1));
    }

    #[test]
    fn byte_slice_len_matches_dir() {
        let bytes = WadBuilder::new()
            .lump("ONE", vec![1; 3])
            .lump("TWO", vec![2; 17])
            .lump("EMPTY", vec![])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();
        for (i, l) in wad.lumps().iter().enumerate() {
            assert_eq!(wad.lump_bytes(i).unwrap().len() as i32, l.size);
        }
    }

    #[test]
    fn partial_trailing_record_is_ignored() {
        let mut bytes = WadBuilder::new().lump("ONE", vec![1; 4]).build();
        bytes.extend_from_slice(&[0xAA; DIR_ENTRY_SIZE - 1]);
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.lumps().len(), 1);
        assert_eq!(wad.lump_name(0), "ONE");
    }

    #[test]
    fn directory_parse_is_idempotent() {
        let bytes = WadBuilder::new()
            .lump("ONE", vec![1; 4])
            .lump("TWO", vec![2; 8])
            .build();
        let a = Wad::from_bytes(bytes.clone()).unwrap();
        let b = Wad::from_bytes(bytes).unwrap();
        assert_eq!(a.lumps(), b.lumps());
    }

    #[test]
    fn rejects_garbage_magic() {
        let err = Wad::from_bytes(b"NOTWAD______".to_vec()).unwrap_err();
        assert!(matches!(err, WadError::BadMagic(m) if &m == b"NOTW"));
    }

    #[test]
    fn truncated_header_is_io_error() {
        let err = Wad::from_bytes(b"IWAD\x01\x00".to_vec()).unwrap_err();
        assert!(matches!(err, WadError::Io(_)));
    }

    #[test]
    fn directory_offset_past_eof() {
        let mut wad = Vec::<u8>::new();
        wad.extend_from_slice(b"IWAD");
        wad.extend(&1i32.to_le_bytes());
        wad.extend(&1_000i32.to_le_bytes());
        let err = Wad::from_bytes(wad).unwrap_err();
        assert!(matches!(err, WadError::DirectoryOutOfBounds { offset: 1_000, .. }));
    }

    #[test]
    fn lump_slice_past_eof() {
        // Header + one directory entry pointing way past EOF.
        let mut wad = Vec::<u8>::new();
        wad.extend_from_slice(b"IWAD");
        wad.extend(&1i32.to_le_bytes()); // num_lumps
        wad.extend(&12i32.to_le_bytes()); // dir_offset

        wad.extend(&1_000i32.to_le_bytes()); // lump offset (past EOF)
        wad.extend(&4i32.to_le_bytes()); // lump size
        wad.extend(b"BAD\0\0\0\0\0");

        let wad = Wad::from_bytes(wad).unwrap();
        let err = wad.lump_bytes(0).unwrap_err();
        assert!(matches!(err, WadError::BadOffset { index: 0, .. }));
        assert!(matches!(wad.lump_bytes(5), Err(WadError::BadIndex(5))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Wad::from_file(dir.path().join("nope.wad")).unwrap_err();
        assert!(matches!(err, WadError::Io(_)));
    }

    #[test]
    fn from_file_matches_from_bytes() {
        let bytes = WadBuilder::new().lump("FOO", vec![7; 12]).build();
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(tmp.path(), &bytes).unwrap();

        let wad = Wad::from_file(tmp.path()).unwrap();
        assert_eq!(wad.lump_bytes(0).unwrap(), &[7; 12]);
    }

    #[derive(Clone, Copy, Debug, PartialEq, bincode::Decode)]
    struct Foo {
        a: i16,
        b: i16,
    }

    impl LumpRecord for Foo {
        const SIZE: usize = 4;
    }

    #[test]
    fn lump_to_vec_decodes_records() {
        let bytes = [1i16, 2, 3, -4]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let wad = Wad::from_bytes(WadBuilder::new().lump("FOO", bytes).build()).unwrap();

        let v: Vec<Foo> = wad.lump_to_vec(0).unwrap();
        assert_eq!(v, vec![Foo { a: 1, b: 2 }, Foo { a: 3, b: -4 }]);
    }

    #[test]
    fn lump_to_vec_rejects_ragged_length() {
        let wad = Wad::from_bytes(WadBuilder::new().lump("FOO", vec![0; 6]).build()).unwrap();
        let err = wad.lump_to_vec::<Foo>(0).unwrap_err();
        assert!(matches!(
            err,
            WadError::BadLumpSize {
                size: 6,
                elem_size: 4,
                ..
            }
        ));
    }

    #[test]
    fn empty_lump_decodes_to_empty_vec() {
        let wad = Wad::from_bytes(WadBuilder::new().lump("FOO", vec![]).build()).unwrap();
        assert!(wad.lump_to_vec::<Foo>(0).unwrap().is_empty());
    }
}
