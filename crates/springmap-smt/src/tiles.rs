//! Tile catalogue decoding.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use springmap_common::Raster;
use springmap_dxt::decode_dxt1;
use tracing::{debug, warn};

use crate::header::{SmtHeader, SMT_HEADER_SIZE};
use crate::Result;

/// Per-tile mipmap resolution of the assembled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MipLevel {
    /// 4x4 texels per tile.
    #[default]
    Size4,
    /// 8x8 texels per tile.
    Size8,
    /// 16x16 texels per tile.
    Size16,
    /// 32x32 texels per tile.
    Size32,
}

impl MipLevel {
    /// Tile side in texels.
    pub const fn side(self) -> u32 {
        match self {
            Self::Size4 => 4,
            Self::Size8 => 8,
            Self::Size16 => 16,
            Self::Size32 => 32,
        }
    }

    /// DXT1 byte length of one tile at this level.
    pub const fn dxt_len(self) -> usize {
        let side = self.side() as usize;
        side * side / 2
    }

    /// Byte offset of this level inside a classic pyramid record.
    pub const fn pyramid_offset(self) -> usize {
        match self {
            Self::Size32 => 0,
            Self::Size16 => 512,
            Self::Size8 => 640,
            Self::Size4 => 672,
        }
    }

    /// Map a side length to a level.
    pub const fn from_side(side: u32) -> Option<Self> {
        match side {
            4 => Some(Self::Size4),
            8 => Some(Self::Size8),
            16 => Some(Self::Size16),
            32 => Some(Self::Size32),
            _ => None,
        }
    }
}

/// How the tile records are stored, deduced from the per-tile stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileLayout {
    /// 680-byte records with the full mip pyramid at fixed offsets.
    Pyramid { stride: usize },
    /// Tightly packed records at a single native mip size.
    Packed { native: MipLevel },
    /// Stride too small for even a 4x4 mip; nothing is decodable.
    Opaque,
}

impl TileLayout {
    /// Deduce the layout from the payload size and tile count.
    fn deduce(payload_len: usize, num_tiles: usize) -> Self {
        if num_tiles == 0 {
            return Self::Opaque;
        }
        let stride = payload_len / num_tiles;
        if stride >= 512 {
            Self::Pyramid { stride }
        } else if stride >= 128 {
            Self::Packed {
                native: MipLevel::Size16,
            }
        } else if stride >= 32 {
            Self::Packed {
                native: MipLevel::Size8,
            }
        } else if stride >= 8 {
            Self::Packed {
                native: MipLevel::Size4,
            }
        } else {
            Self::Opaque
        }
    }
}

/// A decoded catalogue of uniformly sized RGBA tiles.
#[derive(Debug)]
pub struct TileCatalog {
    tiles: Vec<Raster>,
    mip: MipLevel,
    failed: usize,
}

impl TileCatalog {
    /// Parse an SMT file and decode every tile at the requested level.
    pub fn decode(data: &[u8], mip: MipLevel) -> Result<Self> {
        let header = SmtHeader::parse(data)?;
        Ok(Self::decode_tiles(&header, &data[SMT_HEADER_SIZE..], mip))
    }

    /// An empty catalogue: every lookup yields the black fallback.
    pub fn empty(mip: MipLevel) -> Self {
        Self {
            tiles: Vec::new(),
            mip,
            failed: 0,
        }
    }

    fn decode_tiles(header: &SmtHeader, payload: &[u8], mip: MipLevel) -> Self {
        let num_tiles = header.num_tiles.max(0) as usize;
        let layout = TileLayout::deduce(payload.len(), num_tiles);
        debug!(num_tiles, ?layout, ?mip, "decoding tile catalogue");

        let (stride, native, inner_offset) = match layout {
            TileLayout::Pyramid { stride } => (stride, mip, mip.pyramid_offset()),
            TileLayout::Packed { native } => (native.dxt_len(), native, 0),
            TileLayout::Opaque => {
                warn!(
                    num_tiles,
                    payload_len = payload.len(),
                    "tile records too small for any mip level, producing black tiles"
                );
                return Self::empty(mip);
            }
        };

        let decode_one = |i: usize| -> Option<Raster> {
            let record = payload.get(i * stride..i * stride + stride)?;
            let slice = record.get(inner_offset..inner_offset + native.dxt_len())?;
            let rgba = decode_dxt1(slice, native.side(), native.side()).ok()?;
            let tile = Raster::from_rgba(native.side(), native.side(), rgba).ok()?;
            Some(if native == mip {
                tile
            } else {
                resample(tile, mip.side())
            })
        };

        let decoded = Self::decode_all(num_tiles, decode_one);

        let mut failed = 0;
        let tiles = decoded
            .into_iter()
            .enumerate()
            .map(|(i, tile)| {
                tile.unwrap_or_else(|| {
                    warn!(tile = i, "tile decode failed, substituting black");
                    failed += 1;
                    Raster::black(mip.side(), mip.side())
                })
            })
            .collect();

        Self { tiles, mip, failed }
    }

    #[cfg(feature = "parallel")]
    fn decode_all<F>(count: usize, decode_one: F) -> Vec<Option<Raster>>
    where
        F: Fn(usize) -> Option<Raster> + Sync + Send,
    {
        use rayon::prelude::*;
        (0..count).into_par_iter().map(decode_one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn decode_all<F>(count: usize, decode_one: F) -> Vec<Option<Raster>>
    where
        F: Fn(usize) -> Option<Raster> + Sync + Send,
    {
        (0..count).map(decode_one).collect()
    }

    /// The catalogue's tile resolution.
    pub fn mip(&self) -> MipLevel {
        self.mip
    }

    /// Number of decoded tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the catalogue holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles that failed to decode and were blacked out.
    pub fn failed_tiles(&self) -> usize {
        self.failed
    }

    /// Look up a tile by index; out-of-range indices yield `None`.
    pub fn get(&self, index: i32) -> Option<&Raster> {
        usize::try_from(index).ok().and_then(|i| self.tiles.get(i))
    }
}

/// Nearest-neighbour resample of a square tile to a new side length.
fn resample(tile: Raster, side: u32) -> Raster {
    let (w, h) = (tile.width(), tile.height());
    let Some(img) = RgbaImage::from_raw(w, h, tile.into_vec()) else {
        return Raster::black(side, side);
    };
    let resized = imageops::resize(&img, side, side, FilterType::Nearest);
    Raster::from_rgba(side, side, resized.into_raw()).unwrap_or_else(|_| Raster::black(side, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SMT_MAGIC;

    /// Classic tile records hold an entire mip pyramid in 680 bytes:
    /// 512 (32x32) + 128 (16x16) + 32 (8x8) + 8 (4x4).
    const PYRAMID_STRIDE: usize = 680;

    /// One solid-color 4x4 DXT1 block: equal endpoints with index 0
    /// everywhere, so every pixel decodes to the endpoint color.
    fn solid_block(c: u16) -> [u8; 8] {
        let [lo, hi] = c.to_le_bytes();
        [lo, hi, lo, hi, 0, 0, 0, 0]
    }

    fn smt_with_payload(num_tiles: i32, payload: &[u8]) -> Vec<u8> {
        let mut data = SMT_MAGIC.to_vec();
        for v in [1i32, num_tiles, 32, 1] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(payload);
        data
    }

    /// A full 680-byte pyramid record painted a single color.
    fn pyramid_record(c: u16) -> Vec<u8> {
        let mut record = Vec::with_capacity(PYRAMID_STRIDE);
        for _ in 0..PYRAMID_STRIDE / 8 {
            record.extend_from_slice(&solid_block(c));
        }
        record
    }

    #[test]
    fn test_layout_deduction() {
        assert_eq!(
            TileLayout::deduce(680 * 3, 3),
            TileLayout::Pyramid { stride: 680 }
        );
        assert_eq!(
            TileLayout::deduce(128 * 5, 5),
            TileLayout::Packed {
                native: MipLevel::Size16
            }
        );
        assert_eq!(
            TileLayout::deduce(32, 1),
            TileLayout::Packed {
                native: MipLevel::Size8
            }
        );
        assert_eq!(
            TileLayout::deduce(8, 1),
            TileLayout::Packed {
                native: MipLevel::Size4
            }
        );
        assert_eq!(TileLayout::deduce(7, 1), TileLayout::Opaque);
        assert_eq!(TileLayout::deduce(680, 0), TileLayout::Opaque);
    }

    #[test]
    fn test_pyramid_mip_selection() {
        let mut payload = pyramid_record(0xF800);
        payload.extend(pyramid_record(0x001F));
        let data = smt_with_payload(2, &payload);

        for mip in [
            MipLevel::Size4,
            MipLevel::Size8,
            MipLevel::Size16,
            MipLevel::Size32,
        ] {
            let catalog = TileCatalog::decode(&data, mip).unwrap();
            assert_eq!(catalog.len(), 2);
            assert_eq!(catalog.failed_tiles(), 0);

            let red = catalog.get(0).unwrap();
            assert_eq!((red.width(), red.height()), (mip.side(), mip.side()));
            assert_eq!(red.pixel(0, 0), [248, 0, 0, 255]);
            assert_eq!(catalog.get(1).unwrap().pixel(0, 0), [0, 0, 248, 255]);
        }
    }

    #[test]
    fn test_packed_records_resample_up() {
        // Two tightly packed 4x4 tiles requested at 8x8.
        let mut payload = solid_block(0xF800).to_vec();
        payload.extend_from_slice(&solid_block(0x07E0));
        let data = smt_with_payload(2, &payload);

        let catalog = TileCatalog::decode(&data, MipLevel::Size8).unwrap();
        let tile = catalog.get(1).unwrap();
        assert_eq!((tile.width(), tile.height()), (8, 8));
        assert_eq!(tile.pixel(7, 7), [0, 252, 0, 255]);
    }

    #[test]
    fn test_truncated_pyramid_blacks_out_small_mips() {
        // The second record is one byte short, so the stride floors to 679.
        let mut payload = pyramid_record(0xF800);
        payload.extend(&pyramid_record(0x001F)[..679]);
        let data = smt_with_payload(2, &payload);

        // The 32x32 level (offset 0, 512 bytes) still fits each record.
        let catalog = TileCatalog::decode(&data, MipLevel::Size32).unwrap();
        assert_eq!(catalog.failed_tiles(), 0);
        assert_eq!(catalog.get(0).unwrap().pixel(0, 0), [248, 0, 0, 255]);

        // The 4x4 level lives at 672..680, past the 679-byte stride; the
        // decode fails locally and every tile is substituted with black.
        let catalog = TileCatalog::decode(&data, MipLevel::Size4).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.failed_tiles(), 2);
        assert_eq!(catalog.get(1).unwrap().pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_zero_tiles_is_empty() {
        let data = smt_with_payload(0, &[]);
        let catalog = TileCatalog::decode(&data, MipLevel::Size4).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(-1).is_none());
    }
}
