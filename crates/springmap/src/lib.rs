//! SpringRTS map archive parsing.
//!
//! This crate is the facade over the springmap workspace: given a `.sd7`
//! or `.sdz` map archive it extracts the contents into a scoped temporary
//! directory, decodes the SMF layers and the SMT texture mosaic, parses
//! map metadata (`mapinfo.lua`, falling back to legacy `.smd`), optionally
//! tints the texture below sea level and reprojects an embedded cubemap
//! skybox, and hands back one owned [`Map`] value.
//!
//! # Crates
//!
//! - [`springmap_common`] - binary reader and raster primitives
//! - [`springmap_dxt`] - DXT1 block decompression
//! - [`springmap_dds`] - DDS parsing and equirectangular reprojection
//! - [`springmap_smf`] - SMF header and layer extraction
//! - [`springmap_smt`] - SMT tile catalogue and mosaic assembly
//! - [`springmap_meta`] - mapinfo/SMD metadata dictionaries
//! - [`springmap_archive`] - archive extraction and content location
//!
//! # Example
//!
//! ```no_run
//! use springmap::prelude::*;
//!
//! let options = ParseOptions {
//!     mipmap_size: MipLevel::Size8,
//!     parse_skybox: true,
//!     ..Default::default()
//! };
//! let map = springmap::parse_map("maps/red_comet.sd7", &options)?;
//! println!("{}: {} start positions", map.script_name,
//!     map.start_positions().len());
//! # Ok::<(), springmap::Error>(())
//! ```

mod config;
mod error;
mod map;
mod pipeline;
mod resources;
mod water;

pub use config::ParseOptions;
pub use error::{Error, Result};
pub use map::Map;
pub use pipeline::parse_map;
pub use water::{apply_water, WaterParams};

// Re-export all sub-crates
pub use springmap_archive as archive;
pub use springmap_common as common;
pub use springmap_dds as dds;
pub use springmap_dxt as dxt;
pub use springmap_meta as meta;
pub use springmap_smf as smf;
pub use springmap_smt as smt;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{parse_map, Map, ParseOptions};
    pub use springmap_common::{BinaryReader, Raster};
    pub use springmap_meta::Value;
    pub use springmap_smf::SmfMap;
    pub use springmap_smt::MipLevel;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
