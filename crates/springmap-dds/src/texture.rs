//! DDS payload decoding: 2D textures and cubemap faces.

use springmap_common::{BinaryReader, Raster};
use springmap_dxt::decode_dxt1;

use crate::header::{mip_chain_size, mipmap_size, DdsHeader, DdsHeaderDxt10, FourCC};
use crate::{Error, Result, DDS_MAGIC};

/// A parsed DDS file borrowing its pixel payload.
///
/// Parsing validates the magic and headers only; pixel regions are sliced
/// and decoded on demand so a bad trailing face does not poison the rest
/// of the file.
#[derive(Debug)]
pub struct DdsTexture<'a> {
    header: DdsHeader,
    dx10: Option<DdsHeaderDxt10>,
    payload: &'a [u8],
}

impl<'a> DdsTexture<'a> {
    /// Check if data starts with the DDS magic bytes.
    pub fn is_dds(data: &[u8]) -> bool {
        data.len() >= 4 && &data[..4] == DDS_MAGIC
    }

    /// Parse the DDS container headers.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidMagic([0; 4]));
        }
        if &data[..4] != DDS_MAGIC {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&data[..4]);
            return Err(Error::InvalidMagic(magic));
        }

        let mut reader = BinaryReader::new_at(data, 4);
        let header: DdsHeader = reader.read_struct().map_err(Error::Common)?;

        let dx10: Option<DdsHeaderDxt10> = if header.is_dx10() {
            Some(reader.read_struct().map_err(Error::Common)?)
        } else {
            None
        };

        Ok(Self {
            header,
            dx10,
            payload: &data[reader.position()..],
        })
    }

    /// The parsed base header.
    pub fn header(&self) -> &DdsHeader {
        &self.header
    }

    /// The DX10 extension header, when present.
    pub fn dx10(&self) -> Option<&DdsHeaderDxt10> {
        self.dx10.as_ref()
    }

    /// Whether caps2 declares all six cubemap faces.
    pub fn is_cubemap(&self) -> bool {
        self.header.is_cubemap()
    }

    /// Byte size of one face's complete mip chain.
    pub fn face_chain_size(&self) -> usize {
        mip_chain_size(
            self.header.width,
            self.header.height,
            self.header.mip_levels(),
            &self.header.pixel_format,
        )
    }

    /// Slice the top-level mip of the given face (0-5 for cubemaps,
    /// 0 for 2D textures).
    fn top_level_region(&self, face: usize) -> Result<&'a [u8]> {
        let offset = face * self.face_chain_size();
        let len = mipmap_size(self.header.width, self.header.height, &self.header.pixel_format);

        if offset + len > self.payload.len() {
            return Err(Error::RegionOutOfBounds {
                offset,
                len,
                available: self.payload.len(),
            });
        }
        Ok(&self.payload[offset..offset + len])
    }

    /// Decode the top-level mip of a face into an RGBA8 raster.
    pub fn decode_face(&self, face: usize) -> Result<Raster> {
        let region = self.top_level_region(face)?;
        let (w, h) = (self.header.width, self.header.height);
        let format = &self.header.pixel_format;

        if format.is_four_cc() {
            if format.four_cc != FourCC::DXT1 {
                return Err(Error::UnsupportedFormat(format!(
                    "fourCC {}",
                    format.four_cc
                )));
            }
            let rgba = decode_dxt1(region, w, h)?;
            Raster::from_rgba(w, h, rgba).map_err(Error::Common)
        } else if format.is_rgb() {
            decode_uncompressed(region, w, h, format)
        } else {
            let flags = format.flags;
            Err(Error::UnsupportedFormat(format!(
                "pixel format flags {flags:#x}"
            )))
        }
    }

    /// Decode the texture as a plain 2D image (top mip of the first face).
    pub fn decode_2d(&self) -> Result<Raster> {
        self.decode_face(0)
    }
}

/// Decode an uncompressed RGB(A) region using the pixel-format bit masks.
fn decode_uncompressed(
    region: &[u8],
    width: u32,
    height: u32,
    format: &crate::DdsPixelFormat,
) -> Result<Raster> {
    let bpp = format.bytes_per_pixel();
    if bpp != 3 && bpp != 4 {
        let bits = format.rgb_bit_count;
        return Err(Error::UnsupportedFormat(format!(
            "{bits}-bit uncompressed data"
        )));
    }

    let channel = |px: u32, mask: u32| -> u8 {
        if mask == 0 {
            0
        } else {
            ((px & mask) >> mask.trailing_zeros()) as u8
        }
    };

    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for chunk in region.chunks_exact(bpp) {
        let mut px = 0u32;
        for (i, &b) in chunk.iter().enumerate() {
            px |= (b as u32) << (8 * i);
        }
        let a = if format.a_bit_mask == 0 {
            255
        } else {
            channel(px, format.a_bit_mask)
        };
        out.extend_from_slice(&[
            channel(px, format.r_bit_mask),
            channel(px, format.g_bit_mask),
            channel(px, format.b_bit_mask),
            a,
        ]);
    }

    Raster::from_rgba(width, height, out).map_err(Error::Common)
}

/// Six decoded cubemap faces in the stored order +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug)]
pub struct CubeMap {
    faces: [Raster; 6],
    side: u32,
}

impl CubeMap {
    /// Parse and decode a six-face cubemap DDS file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let texture = DdsTexture::parse(data)?;
        if !texture.is_cubemap() {
            let caps2 = texture.header.caps2;
            return Err(Error::NotACubemap { caps2 });
        }

        let faces = [
            texture.decode_face(0)?,
            texture.decode_face(1)?,
            texture.decode_face(2)?,
            texture.decode_face(3)?,
            texture.decode_face(4)?,
            texture.decode_face(5)?,
        ];
        let side = texture.header.width;

        Ok(Self { faces, side })
    }

    /// Build a cubemap from six pre-decoded square faces of equal side.
    pub fn from_faces(faces: [Raster; 6]) -> Self {
        let side = faces[0].width();
        debug_assert!(faces
            .iter()
            .all(|f| f.width() == side && f.height() == side));
        Self { faces, side }
    }

    /// Face side length in pixels.
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Access a face by index (0-5, stored order).
    pub fn face(&self, index: usize) -> &Raster {
        &self.faces[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{DDPF_FOURCC, DDSCAPS2_CUBEMAP, DDSCAPS2_CUBEMAP_ALL_FACES};
    use zerocopy::IntoBytes;

    fn dxt1_header(width: u32, height: u32, caps2: u32, mipmap_count: u32) -> Vec<u8> {
        let header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: 0x1007,
            height,
            width,
            pitch_or_linear_size: 0,
            depth: 0,
            mipmap_count,
            reserved1: [0; 11],
            pixel_format: crate::DdsPixelFormat {
                size: 32,
                flags: DDPF_FOURCC,
                four_cc: FourCC::DXT1,
                rgb_bit_count: 0,
                r_bit_mask: 0,
                g_bit_mask: 0,
                b_bit_mask: 0,
                a_bit_mask: 0,
            },
            caps: 0x1000,
            caps2,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        };

        let mut data = Vec::new();
        data.extend_from_slice(DDS_MAGIC);
        data.extend_from_slice(header.as_bytes());
        data
    }

    /// One solid-color 4x4 DXT1 block.
    fn solid_block(c: u16) -> [u8; 8] {
        let [lo, hi] = c.to_le_bytes();
        [lo, hi, lo, hi, 0, 0, 0, 0]
    }

    #[test]
    fn test_rejects_bad_magic() {
        assert!(matches!(
            DdsTexture::parse(b"NOPEom nom nom"),
            Err(Error::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_decode_2d_dxt1() {
        let mut data = dxt1_header(4, 4, 0, 1);
        data.extend_from_slice(&solid_block(0xF800));

        let texture = DdsTexture::parse(&data).unwrap();
        assert!(!texture.is_cubemap());

        let raster = texture.decode_2d().unwrap();
        assert_eq!(raster.width(), 4);
        assert_eq!(raster.pixel(2, 2), [248, 0, 0, 255]);
    }

    #[test]
    fn test_cubemap_faces_in_order() {
        let caps2 = DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        let mut data = dxt1_header(4, 4, caps2, 1);
        let colors = [0xF800u16, 0x07E0, 0x001F, 0xFFFF, 0x0000, 0xF81F];
        for c in colors {
            data.extend_from_slice(&solid_block(c));
        }

        let cube = CubeMap::parse(&data).unwrap();
        assert_eq!(cube.side(), 4);
        assert_eq!(cube.face(0).pixel(0, 0), [248, 0, 0, 255]);
        assert_eq!(cube.face(2).pixel(0, 0), [0, 0, 248, 255]);
        assert_eq!(cube.face(5).pixel(0, 0), [248, 0, 248, 255]);
    }

    #[test]
    fn test_cubemap_skips_lower_mips() {
        // 8x8 faces with two mip levels: the chain stride must include
        // the 4x4 mip even though only the top level is decoded.
        let caps2 = DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        let mut data = dxt1_header(8, 8, caps2, 2);
        for face in 0u16..6 {
            let c = 0x0800 * (face + 1);
            for _ in 0..4 {
                data.extend_from_slice(&solid_block(c)); // top level, 4 blocks
            }
            data.extend_from_slice(&solid_block(0xFFFF)); // 4x4 mip
        }

        let cube = CubeMap::parse(&data).unwrap();
        assert_eq!(cube.face(1).pixel(7, 7), {
            let [r, g, b] = springmap_dxt::unpack_rgb565(0x1000);
            [r, g, b, 255]
        });
    }

    #[test]
    fn test_not_a_cubemap() {
        let mut data = dxt1_header(4, 4, 0, 1);
        data.extend_from_slice(&solid_block(0));
        assert!(matches!(
            CubeMap::parse(&data),
            Err(Error::NotACubemap { .. })
        ));
    }

    #[test]
    fn test_truncated_face_region() {
        let caps2 = DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        let mut data = dxt1_header(4, 4, caps2, 1);
        data.extend_from_slice(&solid_block(0)); // only one of six faces
        assert!(matches!(
            CubeMap::parse(&data),
            Err(Error::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_uncompressed_rgba() {
        let mut data = dxt1_header(4, 4, 0, 1);
        // Rewrite the pixel format to uncompressed A8R8G8B8.
        let pf_offset = 4 + 72;
        let pf = crate::DdsPixelFormat {
            size: 32,
            flags: crate::header::DDPF_RGB | crate::header::DDPF_ALPHAPIXELS,
            four_cc: FourCC([0; 4]),
            rgb_bit_count: 32,
            r_bit_mask: 0x00FF0000,
            g_bit_mask: 0x0000FF00,
            b_bit_mask: 0x000000FF,
            a_bit_mask: 0xFF000000,
        };
        data[pf_offset..pf_offset + 32].copy_from_slice(pf.as_bytes());
        for _ in 0..16 {
            data.extend_from_slice(&[0x10, 0x20, 0x30, 0x40]); // BGRA in memory
        }

        let raster = DdsTexture::parse(&data).unwrap().decode_2d().unwrap();
        assert_eq!(raster.pixel(0, 0), [0x30, 0x20, 0x10, 0x40]);
    }
}
