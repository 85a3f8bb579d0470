//! DXT1 (BC1) block decompression.
//!
//! DXT1 encodes a 4x4 pixel block in 8 bytes: two little-endian RGB565
//! endpoint colors followed by sixteen 2-bit palette indices. The palette
//! has two modes selected by comparing the raw endpoint values:
//!
//! - `c0 > c1` (opaque mode): `{c0, c1, (2*c0 + c1)/3, (c0 + 2*c1)/3}`,
//!   every entry with alpha 255.
//! - `c0 <= c1` (1-bit-alpha mode): `{c0, c1, (c0 + c1)/2, transparent}`,
//!   where index 3 decodes to RGBA (0, 0, 0, 0).
//!
//! Interpolation is done per channel in integer arithmetic after unpacking.

mod decode;
mod error;

pub use decode::{decode_dxt1, unpack_rgb565};
pub use error::{Error, Result};

/// Compressed byte length of a DXT1 image with the given dimensions.
///
/// Both dimensions must be multiples of 4; each 4x4 block takes 8 bytes.
pub const fn dxt1_len(width: u32, height: u32) -> usize {
    (width as usize / 4) * (height as usize / 4) * 8
}
