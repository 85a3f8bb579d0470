//! DDS header structures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

/// caps2 bit marking a cubemap surface.
pub const DDSCAPS2_CUBEMAP: u32 = 0x200;

/// caps2 mask covering all six cubemap face bits (+X, -X, +Y, -Y, +Z, -Z).
pub const DDSCAPS2_CUBEMAP_ALL_FACES: u32 = 0xFC00;

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.four_cc == FourCC::DX10 && self.pixel_format.is_four_cc()
    }

    /// Check if caps2 declares a six-face cubemap.
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & DDSCAPS2_CUBEMAP != 0
            && self.caps2 & DDSCAPS2_CUBEMAP_ALL_FACES == DDSCAPS2_CUBEMAP_ALL_FACES
    }

    /// Mipmap level count, treating 0 as a single level.
    pub fn mip_levels(&self) -> u32 {
        let count = self.mipmap_count;
        count.max(1)
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

/// DDPF_FOURCC: the fourCC field is valid.
pub const DDPF_FOURCC: u32 = 0x4;
/// DDPF_RGB: uncompressed RGB data with valid bit masks.
pub const DDPF_RGB: u32 = 0x40;
/// DDPF_ALPHAPIXELS: the alpha mask is valid.
pub const DDPF_ALPHAPIXELS: u32 = 0x1;

impl DdsPixelFormat {
    /// Check whether the fourCC field is in effect.
    pub fn is_four_cc(&self) -> bool {
        self.flags & DDPF_FOURCC != 0
    }

    /// Check whether the format is uncompressed RGB(A).
    pub fn is_rgb(&self) -> bool {
        self.flags & DDPF_RGB != 0
    }

    /// Bytes per pixel for uncompressed formats (default 4).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.rgb_bit_count {
            0 => 4,
            bits => (bits / 8) as usize,
        }
    }
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// DX10 extended header (follows the base header when fourCC is "DX10").
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: u32,
    /// Resource dimension.
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size.
    pub array_size: u32,
    /// Misc flags 2.
    pub misc_flags2: u32,
}

/// Get the compressed block size in bytes for a fourCC format.
///
/// DXT1 blocks are 8 bytes; DXT3/DXT5 are 16.
pub fn block_size(four_cc: FourCC) -> usize {
    if four_cc == FourCC::DXT1 {
        8
    } else {
        16
    }
}

/// Byte size of a single mipmap level.
///
/// For block-compressed formats each dimension rounds up to whole 4x4
/// blocks; uncompressed levels are `width * height * bpp`.
pub fn mipmap_size(width: u32, height: u32, format: &DdsPixelFormat) -> usize {
    if format.is_four_cc() {
        let blocks_x = (width as usize + 3) / 4;
        let blocks_y = (height as usize + 3) / 4;
        blocks_x.max(1) * blocks_y.max(1) * block_size(format.four_cc)
    } else {
        width as usize * height as usize * format.bytes_per_pixel()
    }
}

/// Byte size of a full mip chain starting at `width` x `height`.
///
/// Level i has dimensions `(max(1, w >> i), max(1, h >> i))`.
pub fn mip_chain_size(width: u32, height: u32, levels: u32, format: &DdsPixelFormat) -> usize {
    (0..levels)
        .map(|i| mipmap_size((width >> i).max(1), (height >> i).max(1), format))
        .sum()
}
