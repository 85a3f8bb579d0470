//! DDS texture file handling for Spring map skyboxes and resources.
//!
//! Spring map archives embed DDS files in two roles: six-face cubemap
//! skyboxes (reprojected to an equirectangular panorama here) and ordinary
//! 2D resource textures. This crate parses the DDS container (magic,
//! 124-byte header, optional DX10 extension), walks the face/mip data
//! regions, and decodes DXT1 or 32-bit uncompressed pixels into
//! [`Raster`](springmap_common::Raster) values.
//!
//! # Example
//!
//! ```no_run
//! use springmap_dds::{CubeMap, equirectangular};
//!
//! let data = std::fs::read("skybox.dds")?;
//! let cube = CubeMap::parse(&data)?;
//! let panorama = equirectangular(&cube, 1024);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod equirect;
mod error;
mod header;
mod texture;

pub use equirect::equirectangular;
pub use error::{Error, Result};
pub use header::{
    block_size, mipmap_size, DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC,
};
pub use texture::{CubeMap, DdsTexture};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Synthetic file fixtures shared with downstream crate tests.
#[doc(hidden)]
pub mod testdata {
    use crate::header::{DDPF_FOURCC, DDSCAPS2_CUBEMAP, DDSCAPS2_CUBEMAP_ALL_FACES};
    use crate::{DdsHeader, DdsPixelFormat, FourCC, DDS_MAGIC};
    use zerocopy::IntoBytes;

    fn dxt1_header(side: u32, caps2: u32) -> Vec<u8> {
        let header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: 0x1007,
            height: side,
            width: side,
            pitch_or_linear_size: 0,
            depth: 0,
            mipmap_count: 1,
            reserved1: [0; 11],
            pixel_format: DdsPixelFormat {
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

    fn push_solid_face(data: &mut Vec<u8>, side: u32, color: u16) {
        let [lo, hi] = color.to_le_bytes();
        for _ in 0..(side / 4) * (side / 4) {
            data.extend_from_slice(&[lo, hi, lo, hi, 0, 0, 0, 0]);
        }
    }

    /// A single-mip DXT1 cubemap, each face painted one RGB565 color.
    pub fn cubemap_dxt1(side: u32, colors: [u16; 6]) -> Vec<u8> {
        let caps2 = DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        let mut data = dxt1_header(side, caps2);
        for color in colors {
            push_solid_face(&mut data, side, color);
        }
        data
    }

    /// A single-mip 2D DXT1 texture painted one RGB565 color.
    pub fn texture_dxt1(side: u32, color: u16) -> Vec<u8> {
        let mut data = dxt1_header(side, 0);
        push_solid_face(&mut data, side, color);
        data
    }
}
