//! Layer extraction from declared SMF regions.

use springmap_common::{BinaryReader, Raster};
use springmap_dxt::{decode_dxt1, dxt1_len};
use tracing::debug;

use crate::header::SmfHeader;
use crate::{Error, Result};

/// Minimaps are always 1024x1024 DXT1.
const MINIMAP_SIDE: u32 = 1024;

/// Extract the height layer: normalized samples plus a grayscale raster.
///
/// The region holds `(w+1) * (h+1)` little-endian u16 values; each maps to
/// `raw / 65536` in [0, 1) and to the grayscale byte `255 * v`.
pub fn extract_height(data: &[u8], header: &SmfHeader) -> Result<(Vec<f32>, Raster)> {
    let w = header.map_width as u32 + 1;
    let h = header.map_height as u32 + 1;
    let count = w as usize * h as usize;

    let offset = SmfHeader::check_region(data, "height", header.height_map_index, count * 2)?;
    let raw = BinaryReader::new_at(data, offset)
        .read_u16_array(count)
        .map_err(Error::Common)?;

    let mut values = Vec::with_capacity(count);
    let mut pixels = Vec::with_capacity(count);
    for sample in raw {
        let v = sample as f32 / 65536.0;
        values.push(v);
        pixels.push((v * 255.0) as u8);
    }

    let raster = Raster::from_gray(w, h, &pixels).map_err(Error::Common)?;
    Ok((values, raster))
}

/// Extract the terrain-type layer: `(w/2) x (h/2)` bytes broadcast to RGBA.
pub fn extract_type(data: &[u8], header: &SmfHeader) -> Result<Raster> {
    extract_half_res(data, "type", header, header.type_map_index)
}

/// Extract the metal layer: `(w/2) x (h/2)` bytes broadcast to RGBA.
pub fn extract_metal(data: &[u8], header: &SmfHeader) -> Result<Raster> {
    extract_half_res(data, "metal", header, header.metal_map_index)
}

fn extract_half_res(
    data: &[u8],
    region: &'static str,
    header: &SmfHeader,
    index: i32,
) -> Result<Raster> {
    let w = header.map_width as u32 / 2;
    let h = header.map_height as u32 / 2;
    let len = w as usize * h as usize;

    let offset = SmfHeader::check_region(data, region, index, len)?;
    let raster = Raster::from_gray(w, h, &data[offset..offset + len]).map_err(Error::Common)?;
    Ok(raster)
}

/// Extract and decode the 1024x1024 DXT1 minimap.
///
/// The region length is not declared; it is inferred as the distance to
/// the next declared region offset (metal if it follows the minimap, else
/// feature, else the end of the buffer). The historical fixed 699048-byte
/// length over-reads on repacked maps. Only the top mip is decoded;
/// trailing minimap mips are ignored.
pub fn extract_minimap(data: &[u8], header: &SmfHeader) -> Result<Raster> {
    let needed = dxt1_len(MINIMAP_SIDE, MINIMAP_SIDE);
    let offset = SmfHeader::check_region(data, "minimap", header.mini_map_index, needed)?;

    let end = if header.metal_map_index > header.mini_map_index {
        header.metal_map_index as usize
    } else if header.feature_map_index > header.mini_map_index {
        header.feature_map_index as usize
    } else {
        data.len()
    };
    let region_len = end.saturating_sub(offset);
    debug!(offset, region_len, "minimap region inferred");

    if region_len < needed {
        return Err(Error::BadOffset {
            region: "minimap",
            offset,
            len: needed,
            available: end,
        });
    }

    let rgba = decode_dxt1(&data[offset..offset + needed], MINIMAP_SIDE, MINIMAP_SIDE)?;
    Raster::from_rgba(MINIMAP_SIDE, MINIMAP_SIDE, rgba).map_err(Error::Common)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::synthetic_smf;

    #[test]
    fn test_height_scaling() {
        let data = synthetic_smf();
        let header = SmfHeader::parse(&data).unwrap();
        let (values, raster) = extract_height(&data, &header).unwrap();

        // Sample 0 is 0, sample 256 is 256/65536.
        assert_eq!(values[0], 0.0);
        assert_eq!(values[256], 256.0 / 65536.0);
        assert_eq!(raster.pixel(0, 0), [0, 0, 0, 255]);
        // Pixel value is 255 * v, floored.
        assert_eq!(raster.pixel(256 % 129, 256 / 129)[0], 0);
        let high = 16000u32;
        assert_eq!(
            raster.pixel(high % 129, high / 129)[0],
            (high as f32 / 65536.0 * 255.0) as u8
        );
    }

    #[test]
    fn test_minimap_inference_uses_next_region() {
        let data = synthetic_smf();
        let header = SmfHeader::parse(&data).unwrap();
        // Synthetic layout puts the minimap last before the feature offset,
        // with exactly one mip of data.
        let mini = extract_minimap(&data, &header).unwrap();
        assert_eq!((mini.width(), mini.height()), (1024, 1024));
        assert_eq!(mini.pixel(512, 512), [0, 0, 0, 255]);
    }

    #[test]
    fn test_minimap_region_too_short() {
        let data = synthetic_smf();
        let mut header = SmfHeader::parse(&data).unwrap();
        // Claim the feature region starts right after the minimap header,
        // leaving less than one DXT1 mip.
        header.feature_map_index = header.mini_map_index + 1000;
        assert!(matches!(
            extract_minimap(&data, &header),
            Err(Error::BadOffset { region: "minimap", .. })
        ));
    }

    #[test]
    fn test_bad_region_offset() {
        let data = synthetic_smf();
        let mut header = SmfHeader::parse(&data).unwrap();
        header.metal_map_index = data.len() as i32 - 10;
        assert!(matches!(
            extract_metal(&data, &header),
            Err(Error::BadOffset { region: "metal", .. })
        ));
    }
}
