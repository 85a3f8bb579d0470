//! SMF header and tile-index structures.

use springmap_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// SMF magic prefix.
pub const SMF_MAGIC: &[u8; 16] = b"spring map file\0";

/// Total size of the fixed header: magic plus the packed field block.
pub const SMF_HEADER_SIZE: usize = 16 + std::mem::size_of::<RawSmfHeader>();

/// The packed field block following the 16-byte magic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct RawSmfHeader {
    version: i32,
    id: u32,
    map_width: i32,
    map_height: i32,
    square_size: i32,
    texels_per_square: i32,
    tile_size: i32,
    min_depth: f32,
    max_depth: f32,
    height_map_index: i32,
    type_map_index: i32,
    tile_index_map_index: i32,
    mini_map_index: i32,
    metal_map_index: i32,
    feature_map_index: i32,
    extra_header_count: i32,
}

/// An extra header record, kept opaque.
///
/// The known types (grass map, features) are half-specified in the wild;
/// the payload is skipped and only `(header_type, size)` is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraHeader {
    /// Declared record type.
    pub header_type: i32,
    /// Declared record size including the two fixed fields.
    pub size: i32,
}

/// The SMF header record, read bit-exactly from the file prefix.
#[derive(Debug, Clone)]
pub struct SmfHeader {
    /// Format version.
    pub version: i32,
    /// Map id.
    pub id: u32,
    /// Map width in pixels (multiple of 128).
    pub map_width: i32,
    /// Map height in pixels (multiple of 128).
    pub map_height: i32,
    /// Map width in 128-pixel map units.
    pub map_width_units: i32,
    /// Map height in 128-pixel map units.
    pub map_height_units: i32,
    /// World-units per height-map square.
    pub square_size: i32,
    /// Texture texels per square.
    pub texels_per_square: i32,
    /// Tile side in texels.
    pub tile_size: i32,
    /// World elevation of normalized height 0.
    pub min_depth: f32,
    /// World elevation of normalized height 1.
    pub max_depth: f32,
    /// Byte offset of the height region.
    pub height_map_index: i32,
    /// Byte offset of the type region.
    pub type_map_index: i32,
    /// Byte offset of the tile-index region.
    pub tile_index_map_index: i32,
    /// Byte offset of the minimap region.
    pub mini_map_index: i32,
    /// Byte offset of the metal region.
    pub metal_map_index: i32,
    /// Byte offset of the feature region.
    pub feature_map_index: i32,
    /// Skipped extra headers, `(type, size)` only.
    pub extra_headers: Vec<ExtraHeader>,
}

impl SmfHeader {
    /// Parse and validate the header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SMF_MAGIC.len() || &data[..SMF_MAGIC.len()] != SMF_MAGIC {
            return Err(Error::NotASpringMap {
                actual: data[..SMF_MAGIC.len().min(data.len())].to_vec(),
            });
        }

        let mut reader = BinaryReader::new_at(data, SMF_MAGIC.len());
        let raw: RawSmfHeader = reader.read_struct().map_err(Error::Common)?;

        let (w, h) = (raw.map_width, raw.map_height);
        if w <= 0 || h <= 0 || w % 128 != 0 || h % 128 != 0 {
            return Err(Error::InvalidDimensions {
                width: w,
                height: h,
            });
        }

        let mut extra_headers = Vec::with_capacity(raw.extra_header_count.max(0) as usize);
        for _ in 0..raw.extra_header_count {
            let size = reader.read_i32().map_err(Error::Common)?;
            let header_type = reader.read_i32().map_err(Error::Common)?;
            if size < 8 {
                return Err(Error::MalformedExtraHeader(size));
            }
            reader.advance(size as usize - 8);
            extra_headers.push(ExtraHeader { header_type, size });
        }

        Ok(Self {
            version: raw.version,
            id: raw.id,
            map_width: w,
            map_height: h,
            map_width_units: w / 128,
            map_height_units: h / 128,
            square_size: raw.square_size,
            texels_per_square: raw.texels_per_square,
            tile_size: raw.tile_size,
            min_depth: raw.min_depth,
            max_depth: raw.max_depth,
            height_map_index: raw.height_map_index,
            type_map_index: raw.type_map_index,
            tile_index_map_index: raw.tile_index_map_index,
            mini_map_index: raw.mini_map_index,
            metal_map_index: raw.metal_map_index,
            feature_map_index: raw.feature_map_index,
            extra_headers,
        })
    }

    /// Convert a normalized height sample to world elevation.
    pub fn elevation(&self, normalized: f32) -> f32 {
        self.min_depth + normalized * (self.max_depth - self.min_depth)
    }

    /// Number of entries in the tile-index array: `(w/4) * (h/4)`.
    pub fn tile_count(&self) -> usize {
        (self.map_width as usize / 4) * (self.map_height as usize / 4)
    }

    /// Validate that a declared region fits the buffer.
    pub(crate) fn check_region(
        data: &[u8],
        region: &'static str,
        offset: i32,
        len: usize,
    ) -> Result<usize> {
        let offset = offset as usize;
        if offset.checked_add(len).map_or(true, |end| end > data.len()) {
            return Err(Error::BadOffset {
                region,
                offset,
                len,
                available: data.len(),
            });
        }
        Ok(offset)
    }
}

/// The tile-index sub-header and index array.
///
/// Multi-SMT maps exist; the record keeps the first file's entry (the one
/// the mosaic consumes) and skips the rest bit-exactly so the index array
/// is read from the correct offset.
#[derive(Debug, Clone)]
pub struct TileIndexMap {
    /// Number of SMT files referenced by the map.
    pub num_tile_files: i32,
    /// Total tile count across all referenced files.
    pub num_tiles_total: i32,
    /// Tile count in the first referenced file.
    pub num_tiles_in_file: i32,
    /// Name of the first referenced SMT file.
    pub smt_file_name: String,
    /// Row-major per-tile indices, `(w/4) * (h/4)` entries.
    pub indices: Vec<i32>,
}

impl TileIndexMap {
    /// Parse the tile-index region declared by the header.
    pub fn parse(data: &[u8], header: &SmfHeader) -> Result<Self> {
        let offset = SmfHeader::check_region(data, "tile index", header.tile_index_map_index, 12)?;
        let mut reader = BinaryReader::new_at(data, offset);

        let num_tile_files = reader.read_i32().map_err(Error::Common)?;
        let num_tiles_total = reader.read_i32().map_err(Error::Common)?;
        let num_tiles_in_file = reader.read_i32().map_err(Error::Common)?;
        let smt_file_name = reader.read_cstring().map_err(Error::Common)?.to_string();

        // Skip the remaining (count, name) pairs of multi-SMT maps.
        for _ in 1..num_tile_files {
            let _count = reader.read_i32().map_err(Error::Common)?;
            let _name = reader.read_cstring().map_err(Error::Common)?;
        }

        let indices = reader
            .read_i32_array(header.tile_count())
            .map_err(Error::Common)?;

        Ok(Self {
            num_tile_files,
            num_tiles_total,
            num_tiles_in_file,
            smt_file_name,
            indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_header_is_64_bytes() {
        assert_eq!(std::mem::size_of::<RawSmfHeader>(), 64);
        assert_eq!(SMF_HEADER_SIZE, 80);
    }

    #[test]
    fn test_elevation_mapping() {
        let data = crate::testdata::synthetic_smf();
        let header = SmfHeader::parse(&data).unwrap();

        assert_eq!(header.elevation(0.0), -50.0);
        assert_eq!(header.elevation(1.0), 200.0);
        assert_eq!(header.elevation(0.2), 0.0);
    }

    #[test]
    fn test_rejects_non_multiple_dimensions() {
        let mut data = crate::testdata::synthetic_smf();
        data[24..28].copy_from_slice(&100i32.to_le_bytes());
        assert!(matches!(
            SmfHeader::parse(&data),
            Err(Error::InvalidDimensions { width: 100, .. })
        ));
    }

    #[test]
    fn test_region_bounds_check() {
        let data = crate::testdata::synthetic_smf();
        let err = SmfHeader::check_region(&data, "height", data.len() as i32, 16).unwrap_err();
        assert!(matches!(err, Error::BadOffset { region: "height", .. }));
        assert!(SmfHeader::check_region(&data, "height", 80, 16).is_ok());
    }

    #[test]
    fn test_multi_file_skip() {
        // Rebuild the synthetic tile-index region with two SMT entries.
        let base = crate::testdata::synthetic_smf();
        let header = SmfHeader::parse(&base).unwrap();

        let mut region = Vec::new();
        region.extend_from_slice(&2i32.to_le_bytes());
        region.extend_from_slice(&40i32.to_le_bytes());
        region.extend_from_slice(&30i32.to_le_bytes());
        region.extend_from_slice(b"first.smt\0");
        region.extend_from_slice(&10i32.to_le_bytes());
        region.extend_from_slice(b"second.smt\0");
        for i in 0..header.tile_count() {
            region.extend_from_slice(&(i as i32 % 30).to_le_bytes());
        }

        let mut data = base[..SMF_HEADER_SIZE].to_vec();
        data.extend_from_slice(&region);
        // Point every other region past the data we care about here.
        let tile_index = TileIndexMap::parse(&data, &header).unwrap();

        assert_eq!(tile_index.num_tile_files, 2);
        assert_eq!(tile_index.num_tiles_in_file, 30);
        assert_eq!(tile_index.smt_file_name, "first.smt");
        assert_eq!(tile_index.indices.len(), 1024);
        assert_eq!(tile_index.indices[31], 1);
    }
}
