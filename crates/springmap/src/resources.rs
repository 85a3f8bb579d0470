//! Loading `mapinfo.resources.*` entries as rasters.

use std::collections::BTreeMap;
use std::path::Path;

use springmap_archive::MapFiles;
use springmap_common::Raster;
use springmap_dds::DdsTexture;
use springmap_meta::Value;
use tracing::warn;

/// Load the resource rasters named by the metadata `resources` table.
///
/// Entries are matched case-insensitively against the extracted tree.
/// `allowlist`, when given, restricts which keys are loaded. A resource
/// that is missing or fails to decode is skipped with a warning; resource
/// loading never fails the parse.
pub fn load_resources(
    meta: Option<&Value>,
    files: &MapFiles,
    allowlist: Option<&[String]>,
) -> BTreeMap<String, Raster> {
    let mut out = BTreeMap::new();
    let Some(table) = meta
        .and_then(|m| m.lookup("resources"))
        .and_then(Value::as_table)
    else {
        return out;
    };

    for (key, value) in table {
        if let Some(allowed) = allowlist {
            if !allowed.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                continue;
            }
        }
        let Some(file_name) = value.as_str() else {
            continue;
        };
        // Resource values may carry a maps/ prefix; match on the name.
        let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);

        let Some(path) = files.find_resource(base_name) else {
            warn!(key, file_name, "resource not found in archive");
            continue;
        };
        match load_raster(path) {
            Some(raster) => {
                out.insert(key.clone(), raster);
            }
            None => warn!(key, path = %path.display(), "resource failed to decode"),
        }
    }

    out
}

/// Decode one resource image: DDS through the in-house reader, anything
/// else through the image collaborator.
fn load_raster(path: &Path) -> Option<Raster> {
    let is_dds = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dds"));

    if is_dds {
        let data = std::fs::read(path).ok()?;
        DdsTexture::parse(&data).ok()?.decode_2d().ok()
    } else {
        let img = image::open(path).ok()?.to_rgba8();
        let (w, h) = img.dimensions();
        Raster::from_rgba(w, h, img.into_raw()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use springmap_archive::locate_map_files;
    use std::collections::BTreeMap as Map;

    fn meta_with_resources(entries: &[(&str, &str)]) -> Value {
        let mut resources = Map::new();
        for (k, v) in entries {
            resources.insert(k.to_string(), Value::String(v.to_string()));
        }
        let mut root = Map::new();
        root.insert("resources".to_string(), Value::Table(resources));
        Value::Table(root)
    }

    #[test]
    fn test_loads_png_resource() {
        let dir = tempfile::TempDir::new().unwrap();
        let png_path = dir.path().join("maps/detailtex.png");
        std::fs::create_dir_all(png_path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 255]))
            .save(&png_path)
            .unwrap();

        let files = locate_map_files(dir.path()).unwrap();
        let meta = meta_with_resources(&[("detailTex", "maps/detailTex.png")]);
        let loaded = load_resources(Some(&meta), &files, None);

        let raster = loaded.get("detailTex").unwrap();
        assert_eq!((raster.width(), raster.height()), (4, 2));
        assert_eq!(raster.pixel(3, 1), [1, 2, 3, 255]);
    }

    #[test]
    fn test_allowlist_filters_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let png_path = dir.path().join("a.png");
        image::RgbaImage::new(2, 2).save(&png_path).unwrap();

        let files = locate_map_files(dir.path()).unwrap();
        let meta = meta_with_resources(&[("detailTex", "a.png"), ("specularTex", "a.png")]);

        let loaded = load_resources(Some(&meta), &files, Some(&["speculartex".to_string()]));
        assert!(loaded.contains_key("specularTex"));
        assert!(!loaded.contains_key("detailTex"));
    }

    #[test]
    fn test_missing_resource_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = locate_map_files(dir.path()).unwrap();
        let meta = meta_with_resources(&[("detailTex", "nope.png")]);

        let loaded = load_resources(Some(&meta), &files, None);
        assert!(loaded.is_empty());
    }
}
