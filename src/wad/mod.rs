pub mod level;
pub mod loader;
pub mod raw;

#[cfg(test)]
pub(crate) mod testutil;

pub use level::{LevelError, RawLevel};
pub use loader::{LoadError, load_level, load_map};
pub use raw::{LumpInfo, LumpRecord, Wad, WadError, WadHeader};
