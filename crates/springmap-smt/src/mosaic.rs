//! Texture mosaic assembly from the tile-index array.

use springmap_common::Raster;
use tracing::{debug, warn};

use crate::tiles::TileCatalog;

/// Tiles per map unit along each axis (a map unit is 128 pixels, a tile
/// covers 4, so 32 tiles per unit).
pub const TILES_PER_UNIT: u32 = 32;

/// Expand the tile-index array into the full map texture.
///
/// The mosaic is `width_units * 32` tiles wide and `height_units * 32`
/// tiles tall; each tile contributes `mip.side()` pixels. Indices are
/// consumed row-major, y-rows outer. A missing or out-of-range index
/// draws the opaque-black fallback tile, preserving the map geometry.
///
/// The output buffer is always exactly `width * height * 4` bytes.
pub fn build_texture(
    catalog: &TileCatalog,
    indices: &[i32],
    width_units: i32,
    height_units: i32,
) -> Raster {
    let side = catalog.mip().side();
    let cols = width_units.max(0) as u32 * TILES_PER_UNIT;
    let rows = height_units.max(0) as u32 * TILES_PER_UNIT;

    let mut out = Raster::black(cols * side, rows * side);
    let black = Raster::black(side, side);
    let mut holes = 0usize;

    for ty in 0..rows {
        for tx in 0..cols {
            let slot = (ty * cols + tx) as usize;
            let tile = indices
                .get(slot)
                .and_then(|&idx| catalog.get(idx))
                .unwrap_or_else(|| {
                    holes += 1;
                    &black
                });
            out.blit(tile, tx * side, ty * side);
        }
    }

    if holes > 0 {
        warn!(holes, "mosaic tiles substituted with black");
    }
    debug!(
        width = out.width(),
        height = out.height(),
        tiles = rows as usize * cols as usize,
        "assembled texture mosaic"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SMT_MAGIC;
    use crate::tiles::MipLevel;

    fn two_tile_catalog() -> TileCatalog {
        // Packed 4x4 records: red then green.
        let mut data = SMT_MAGIC.to_vec();
        for v in [1i32, 2, 32, 1] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for c in [0xF800u16, 0x07E0] {
            let [lo, hi] = c.to_le_bytes();
            data.extend_from_slice(&[lo, hi, lo, hi, 0, 0, 0, 0]);
        }
        TileCatalog::decode(&data, MipLevel::Size4).unwrap()
    }

    #[test]
    fn test_mosaic_dimensions() {
        let catalog = two_tile_catalog();
        let indices = vec![0i32; 32 * 32];
        let out = build_texture(&catalog, &indices, 1, 1);

        assert_eq!((out.width(), out.height()), (128, 128));
        assert_eq!(out.data().len(), 128 * 128 * 4);
    }

    #[test]
    fn test_mosaic_row_major_placement() {
        let catalog = two_tile_catalog();
        // First row of tiles green, everything else red.
        let mut indices = vec![0i32; 32 * 32];
        for idx in indices.iter_mut().take(32) {
            *idx = 1;
        }
        let out = build_texture(&catalog, &indices, 1, 1);

        assert_eq!(out.pixel(0, 0), [0, 252, 0, 255]);
        assert_eq!(out.pixel(127, 3), [0, 252, 0, 255]);
        assert_eq!(out.pixel(0, 4), [248, 0, 0, 255]);
    }

    #[test]
    fn test_out_of_range_index_is_black_hole() {
        let catalog = two_tile_catalog();
        let mut indices = vec![0i32; 32 * 32];
        indices[0] = 99; // beyond the catalogue
        indices[1] = -3;
        let out = build_texture(&catalog, &indices, 1, 1);

        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.pixel(4, 0), [0, 0, 0, 255]);
        assert_eq!(out.pixel(8, 0), [248, 0, 0, 255]);
    }

    #[test]
    fn test_short_index_array_fills_black() {
        let catalog = two_tile_catalog();
        let out = build_texture(&catalog, &[0i32; 10], 1, 1);

        assert_eq!(out.data().len(), 128 * 128 * 4);
        assert_eq!(out.pixel(0, 127), [0, 0, 0, 255]);
    }

    #[test]
    fn test_empty_catalog_is_all_black() {
        let catalog = TileCatalog::empty(MipLevel::Size8);
        let indices = vec![0i32; 32 * 32];
        let out = build_texture(&catalog, &indices, 1, 1);

        assert_eq!((out.width(), out.height()), (256, 256));
        assert!(out
            .data()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255]));
    }
}
