//! Spring Map File (SMF) parsing.
//!
//! An SMF file is a header followed by offset-indexed byte regions, one per
//! map layer. This crate reads the header bit-exactly, walks the
//! tile-index sub-header, and extracts the height, type, metal and minimap
//! layers into RGBA rasters:
//!
//! - **height**: `(w+1) x (h+1)` little-endian u16 samples, kept both as
//!   normalized floats in [0, 1] and as a grayscale raster;
//! - **type** / **metal**: `(w/2) x (h/2)` single-byte layers, broadcast
//!   to RGBA;
//! - **minimap**: a DXT1-compressed 1024x1024 image whose region size is
//!   inferred from the next declared offset;
//! - **tile index**: the per-tile SMT lookup table consumed by the mosaic
//!   builder.
//!
//! # Example
//!
//! ```no_run
//! use springmap_smf::SmfMap;
//!
//! let data = std::fs::read("maps/red_comet.smf")?;
//! let map = SmfMap::parse(&data)?;
//! println!("{}x{} ({} tiles)", map.header.map_width, map.header.map_height,
//!     map.tile_index.indices.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod layers;

pub use error::{Error, Result};
pub use header::{ExtraHeader, SmfHeader, TileIndexMap, SMF_HEADER_SIZE, SMF_MAGIC};

use springmap_common::Raster;
use tracing::debug;

/// A fully parsed SMF file: header record, tile-index table, and the four
/// raster layers.
#[derive(Debug)]
pub struct SmfMap {
    /// The bit-exact header record.
    pub header: SmfHeader,
    /// Tile-index sub-header and index array.
    pub tile_index: TileIndexMap,
    /// Normalized height samples in [0, 1], row-major,
    /// `(map_width + 1) * (map_height + 1)` values.
    pub height_values: Vec<f32>,
    /// Height layer as a grayscale raster, `(w+1) x (h+1)`.
    pub height_map: Raster,
    /// Terrain-type layer, `(w/2) x (h/2)`.
    pub type_map: Raster,
    /// Metal-spot layer, `(w/2) x (h/2)`.
    pub metal_map: Raster,
    /// Decoded 1024x1024 minimap.
    pub mini_map: Raster,
}

impl SmfMap {
    /// Parse a complete SMF file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = SmfHeader::parse(data)?;
        debug!(
            width = header.map_width,
            height = header.map_height,
            version = header.version,
            "parsed SMF header"
        );

        let tile_index = TileIndexMap::parse(data, &header)?;
        let (height_values, height_map) = layers::extract_height(data, &header)?;
        let type_map = layers::extract_type(data, &header)?;
        let metal_map = layers::extract_metal(data, &header)?;
        let mini_map = layers::extract_minimap(data, &header)?;

        Ok(Self {
            header,
            tile_index,
            height_values,
            height_map,
            type_map,
            metal_map,
            mini_map,
        })
    }

    /// Smallest and largest observed normalized height.
    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &v in &self.height_values {
            min = min.min(v);
            max = max.max(v);
        }
        if self.height_values.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

/// Synthetic file fixtures shared with downstream crate tests.
#[doc(hidden)]
pub mod testdata {
    use crate::header::{SMF_HEADER_SIZE, SMF_MAGIC};

    /// Build a minimal valid 128x128 SMF buffer for tests.
    ///
    /// Layout: header, tile-index region, height, type, metal, minimap.
    pub fn synthetic_smf() -> Vec<u8> {
        let (w, h) = (128i32, 128i32);
        let height_len = ((w + 1) * (h + 1) * 2) as usize;
        let half_len = ((w / 2) * (h / 2)) as usize;
        let tile_count = ((w / 4) * (h / 4)) as usize;
        let minimap_len = 1024 * 1024 / 2;

        let tile_index_ofs = SMF_HEADER_SIZE;
        let tile_index_len = 12 + "tiles.smt\0".len() + tile_count * 4;
        let height_ofs = tile_index_ofs + tile_index_len;
        let type_ofs = height_ofs + height_len;
        let metal_ofs = type_ofs + half_len;
        let mini_ofs = metal_ofs + half_len;
        let total = mini_ofs + minimap_len;

        let mut data = Vec::with_capacity(total);
        data.extend_from_slice(SMF_MAGIC);
        let push_i32 = |data: &mut Vec<u8>, v: i32| data.extend_from_slice(&v.to_le_bytes());
        push_i32(&mut data, 1); // version
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes()); // id
        push_i32(&mut data, w);
        push_i32(&mut data, h);
        push_i32(&mut data, 512); // square size
        push_i32(&mut data, 8); // texels per square
        push_i32(&mut data, 32); // tile size
        data.extend_from_slice(&(-50.0f32).to_le_bytes()); // min depth
        data.extend_from_slice(&200.0f32.to_le_bytes()); // max depth
        push_i32(&mut data, height_ofs as i32);
        push_i32(&mut data, type_ofs as i32);
        push_i32(&mut data, tile_index_ofs as i32);
        push_i32(&mut data, mini_ofs as i32);
        push_i32(&mut data, metal_ofs as i32);
        push_i32(&mut data, total as i32); // feature region (empty, at end)
        push_i32(&mut data, 0); // extra headers

        // Tile-index region: one tile file, all indices zero.
        push_i32(&mut data, 1);
        push_i32(&mut data, 1);
        push_i32(&mut data, 1);
        data.extend_from_slice(b"tiles.smt\0");
        data.extend(std::iter::repeat(0u8).take(tile_count * 4));

        // Height: ramp over the low 16 bits.
        for i in 0..((w + 1) * (h + 1)) as usize {
            data.extend_from_slice(&((i % 65536) as u16).to_le_bytes());
        }
        // Type and metal: constant bytes.
        data.extend(std::iter::repeat(7u8).take(half_len));
        data.extend(std::iter::repeat(42u8).take(half_len));
        // Minimap: all-zero DXT1 blocks (c0 == c1 == 0, index 0) decode
        // to opaque black.
        data.extend(std::iter::repeat(0u8).take(minimap_len));

        assert_eq!(data.len(), total);
        data
    }
}
