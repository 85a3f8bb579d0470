//! Spring Map Tile (SMT) parsing and texture mosaic assembly.
//!
//! An SMT file is a catalogue of DXT1-compressed square tiles referenced
//! by the SMF tile-index array. Two storage conventions exist in the wild
//! and are told apart by the per-tile stride:
//!
//! - the classic 680-byte record holding a whole mip pyramid
//!   (32x32 -> 16x16 -> 8x8 -> 4x4 at fixed internal offsets);
//! - tightly packed single-mip records whose native size is deduced from
//!   the stride.
//!
//! [`TileCatalog`] decodes every tile at a requested [`MipLevel`];
//! [`build_texture`] then expands the tile-index array into the full map
//! texture. A tile that fails to decode is replaced by an opaque-black
//! tile so one damaged record costs a visible hole, not the whole map.

mod error;
mod header;
mod mosaic;
mod tiles;

pub use error::{Error, Result};
pub use header::{SmtHeader, SMT_HEADER_SIZE, SMT_MAGIC};
pub use mosaic::build_texture;
pub use tiles::{MipLevel, TileCatalog};

/// Synthetic file fixtures shared with downstream crate tests.
#[doc(hidden)]
pub mod testdata {
    use crate::SMT_MAGIC;

    /// Build an SMT buffer of classic 680-byte pyramid records, one per
    /// color, each painted solid in every mip level.
    pub fn synthetic_smt(colors: &[u16]) -> Vec<u8> {
        let mut data = SMT_MAGIC.to_vec();
        for v in [1i32, colors.len() as i32, 32, 1] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for &c in colors {
            let [lo, hi] = c.to_le_bytes();
            for _ in 0..680 / 8 {
                data.extend_from_slice(&[lo, hi, lo, hi, 0, 0, 0, 0]);
            }
        }
        data
    }
}
