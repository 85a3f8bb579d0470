//! SMT header structures.

use springmap_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// SMT magic prefix.
pub const SMT_MAGIC: &[u8; 16] = b"spring tilefile\0";

/// Total size of the fixed header: magic plus the packed field block.
pub const SMT_HEADER_SIZE: usize = 16 + std::mem::size_of::<RawSmtHeader>();

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct RawSmtHeader {
    version: i32,
    num_tiles: i32,
    tile_size: i32,
    compression_type: i32,
}

/// The SMT header record.
#[derive(Debug, Clone, Copy)]
pub struct SmtHeader {
    /// Format version.
    pub version: i32,
    /// Number of tile records in this file.
    pub num_tiles: i32,
    /// Declared tile side in texels.
    pub tile_size: i32,
    /// Declared compression type (1 = DXT1).
    pub compression_type: i32,
}

impl SmtHeader {
    /// Parse and validate the 32-byte header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SMT_MAGIC.len() || &data[..SMT_MAGIC.len()] != SMT_MAGIC {
            return Err(Error::NotASpringTileFile {
                actual: data[..SMT_MAGIC.len().min(data.len())].to_vec(),
            });
        }

        let mut reader = BinaryReader::new_at(data, SMT_MAGIC.len());
        let raw: RawSmtHeader = reader.read_struct().map_err(Error::Common)?;

        Ok(Self {
            version: raw.version,
            num_tiles: raw.num_tiles,
            tile_size: raw.tile_size,
            compression_type: raw.compression_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(SMT_HEADER_SIZE, 32);
    }

    #[test]
    fn test_parse_header() {
        let mut data = SMT_MAGIC.to_vec();
        for v in [1i32, 9, 32, 1] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let header = SmtHeader::parse(&data).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.num_tiles, 9);
        assert_eq!(header.tile_size, 32);
        assert_eq!(header.compression_type, 1);
    }

    #[test]
    fn test_rejects_bad_magic() {
        assert!(matches!(
            SmtHeader::parse(b"spring map file\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0"),
            Err(Error::NotASpringTileFile { .. })
        ));
    }
}
