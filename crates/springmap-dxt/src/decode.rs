//! The DXT1 block decoder.

use crate::{Error, Result};

/// Unpack an RGB565 value into 8-bit channels by shift widening.
///
/// Low bits are zero-padded, not bit-replicated: pure white decodes to
/// (248, 252, 248), never 255, and interpolated palette steps stay evenly
/// spaced across gradients. Deliberate; do not switch to replication.
#[inline]
pub const fn unpack_rgb565(v: u16) -> [u8; 3] {
    [
        ((v & 0xF800) >> 8) as u8,
        ((v & 0x07E0) >> 3) as u8,
        ((v & 0x001F) << 3) as u8,
    ]
}

/// Build the 4-entry RGBA palette for one block.
///
/// `c0 > c1` selects the opaque 4-color mode; otherwise the block is in
/// 1-bit-alpha mode and index 3 is transparent black.
fn block_palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let [r0, g0, b0] = unpack_rgb565(c0);
    let [r1, g1, b1] = unpack_rgb565(c1);

    let p0 = [r0, g0, b0, 255];
    let p1 = [r1, g1, b1, 255];

    if c0 > c1 {
        let lerp3 = |a: u8, b: u8| ((2 * a as u16 + b as u16) / 3) as u8;
        [
            p0,
            p1,
            [lerp3(r0, r1), lerp3(g0, g1), lerp3(b0, b1), 255],
            [lerp3(r1, r0), lerp3(g1, g0), lerp3(b1, b0), 255],
        ]
    } else {
        let mid = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        [
            p0,
            p1,
            [mid(r0, r1), mid(g0, g1), mid(b0, b1), 255],
            [0, 0, 0, 0],
        ]
    }
}

/// Decompress a DXT1 block stream into an RGBA8 buffer.
///
/// `width` and `height` are the output dimensions in pixels; both must be
/// positive multiples of 4. Blocks are laid out row-major across the 4x4
/// grid. Within a block each of the 4 index bytes holds one pixel row,
/// top-down, with the 2-bit indices packed LSB-first left to right.
///
/// The returned buffer is exactly `width * height * 4` bytes.
pub fn decode_dxt1(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 || width % 4 != 0 || height % 4 != 0 {
        return Err(Error::BadDimensions { width, height });
    }

    let blocks_x = (width / 4) as usize;
    let blocks_y = (height / 4) as usize;
    let needed = blocks_x * blocks_y * 8;
    if data.len() < needed {
        return Err(Error::Truncated {
            needed,
            available: data.len(),
        });
    }

    let w = width as usize;
    let mut out = vec![0u8; w * height as usize * 4];

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let block = &data[(by * blocks_x + bx) * 8..][..8];
            let c0 = u16::from_le_bytes([block[0], block[1]]);
            let c1 = u16::from_le_bytes([block[2], block[3]]);
            let palette = block_palette(c0, c1);

            for py in 0..4 {
                let row_bits = block[4 + py];
                let row_base = ((by * 4 + py) * w + bx * 4) * 4;
                for px in 0..4 {
                    let idx = (row_bits >> (2 * px)) & 0b11;
                    let o = row_base + px * 4;
                    out[o..o + 4].copy_from_slice(&palette[idx as usize]);
                }
            }
        }
    }

    Ok(out)
}
