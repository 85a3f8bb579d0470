//! Pipeline configuration.

use springmap_smt::MipLevel;

/// Options accepted by [`parse_map`](crate::parse_map).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Emit progress lines at `info` level instead of `debug`.
    pub verbose: bool,
    /// Per-tile resolution of the texture mosaic; the final texture
    /// scales linearly with it.
    pub mipmap_size: MipLevel,
    /// Skip SMT decoding entirely; the map carries no texture.
    pub skip_smt: bool,
    /// Tint texture pixels below sea level (maps with `minDepth < 0`).
    pub water: bool,
    /// Base water color (R, G, B).
    pub water_color: [u8; 3],
    /// Per-channel water modifier.
    pub water_modifier: [f32; 3],
    /// Load `mapinfo.resources.*` entries as rasters.
    pub parse_resources: bool,
    /// Allowlist of resource keys; `None` loads every entry.
    pub resources: Option<Vec<String>>,
    /// Reproject an embedded DDS cubemap skybox, if present.
    pub parse_skybox: bool,
    /// Output width of the equirectangular skybox (height is half).
    pub skybox_width: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            mipmap_size: MipLevel::Size4,
            skip_smt: false,
            water: true,
            // Historical tint of generated minimaps.
            water_color: [33, 35, 77],
            water_modifier: [1.0, 1.2, 1.0],
            parse_resources: false,
            resources: None,
            parse_skybox: false,
            skybox_width: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.verbose);
        assert_eq!(options.mipmap_size, MipLevel::Size4);
        assert!(!options.skip_smt);
        assert!(options.water);
        assert_eq!(options.water_color, [33, 35, 77]);
        assert!(!options.parse_skybox);
        assert_eq!(options.skybox_width, 1024);
    }
}
