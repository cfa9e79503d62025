//! Top-down Doom map viewer.
//!
//! * [`wad`] – archive reader and map decoder
//! * [`world`] – decoded geometry, BSP visibility walk, per-frame viewer state
//! * [`renderer`] – coordinate mapping and the automap draw stream

pub mod renderer;
pub mod wad;
pub mod world;
