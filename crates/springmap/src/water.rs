//! Water overlay: tint texture pixels below sea level.

use springmap_common::Raster;
use springmap_smf::SmfMap;
use springmap_smt::MipLevel;
use tracing::debug;

/// Water tint parameters.
#[derive(Debug, Clone, Copy)]
pub struct WaterParams {
    /// Base water color (R, G, B).
    pub color: [u8; 3],
    /// Per-channel modifier applied after blending.
    pub modifier: [f32; 3],
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            color: [33, 35, 77],
            modifier: [1.0, 1.2, 1.0],
        }
    }
}

/// Tint every texture pixel whose terrain sits below sea level.
///
/// A no-op for maps with `minDepth >= 0`: they have no submerged ground,
/// and the texture must come out byte-identical. For submerged pixels
/// each color channel becomes
/// `clamp(((base + old * (h / level)) / 2) * modifier)` where `h` is the
/// normalized height sampled from the `(w+1) x (h+1)` grid at
/// `(x+1) / ratio, (y+1) / ratio` (`ratio` = texture pixels per height
/// sample = mip side / 4) and `level` is the normalized sea level.
/// Alpha is untouched.
pub fn apply_water(texture: &mut Raster, smf: &SmfMap, mip: MipLevel, params: &WaterParams) {
    let header = &smf.header;
    if header.min_depth >= 0.0 {
        return;
    }

    let water_level = header.min_depth.abs() / (header.max_depth - header.min_depth);
    let ratio = (mip.side() / 4).max(1);
    let grid_w = header.map_width as u32 + 1;
    let grid_h = header.map_height as u32 + 1;
    debug!(water_level, ratio, "applying water overlay");

    let mut tinted = 0usize;
    for y in 0..texture.height() {
        let hy = ((y + 1) / ratio).min(grid_h - 1);
        for x in 0..texture.width() {
            let hx = ((x + 1) / ratio).min(grid_w - 1);
            let h = smf.height_values[(hy * grid_w + hx) as usize];
            if h >= water_level {
                continue;
            }

            let depth_blend = h / water_level;
            let offset = texture.pixel_offset(x, y);
            let px = texture.data_mut();
            for c in 0..3 {
                let old = px[offset + c] as f32;
                let new = ((params.color[c] as f32 + old * depth_blend) / 2.0)
                    * params.modifier[c];
                px[offset + c] = new.clamp(0.0, 255.0) as u8;
            }
            tinted += 1;
        }
    }
    debug!(tinted, "water overlay complete");
}
