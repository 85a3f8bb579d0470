//! The assembled map value.

use std::collections::BTreeMap;

use springmap_common::Raster;
use springmap_meta::Value;
use springmap_smf::SmfHeader;

/// Everything the pipeline knows about one parsed map.
#[derive(Debug)]
pub struct Map {
    /// Archive file stem, e.g. `red_comet`.
    pub file_name: String,
    /// Display label derived from metadata (see [`derive_script_name`]).
    pub script_name: String,
    /// World elevation of normalized height 0.
    pub min_height: f32,
    /// World elevation of normalized height 1.
    pub max_height: f32,
    /// `mapinfo.lua` dictionary, when present and parseable.
    pub meta: Option<Value>,
    /// Legacy `.smd` dictionary, when present.
    pub smd: Option<Value>,
    /// The SMF header record.
    pub header: SmfHeader,
    /// Normalized height samples in [0, 1], `(w+1) * (h+1)` values.
    pub height_values: Vec<f32>,
    /// Height layer, `(w+1) x (h+1)`.
    pub height_map: Raster,
    /// Terrain-type layer, `(w/2) x (h/2)`.
    pub type_map: Raster,
    /// Metal layer, `(w/2) x (h/2)`.
    pub metal_map: Raster,
    /// Decoded 1024x1024 minimap.
    pub mini_map: Raster,
    /// Full texture mosaic, unless SMT decoding was skipped.
    pub texture: Option<Raster>,
    /// Loaded `mapinfo.resources.*` rasters by key.
    pub resources: Option<BTreeMap<String, Raster>>,
    /// Equirectangular skybox panorama, when requested and present.
    pub skybox: Option<Raster>,
}

impl Map {
    /// Start positions from the legacy `.smd` dictionary, as `(x, z)`
    /// world coordinates in file order. Maps described only by
    /// `mapinfo.lua` keep their positions under `meta.teams` instead.
    pub fn start_positions(&self) -> Vec<(f64, f64)> {
        self.smd
            .as_ref()
            .and_then(|smd| smd.lookup("startPositions"))
            .and_then(Value::as_list)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|p| Some((p.f64_at("x")?, p.f64_at("z")?)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Derive the display label for a map.
///
/// Uses metadata `name`/`version`: a name already containing the version
/// is used verbatim, otherwise the version is appended; with no metadata
/// name at all the SMF file stem stands in.
pub fn derive_script_name(meta: Option<&Value>, stem: &str) -> String {
    let name = meta.and_then(|m| m.str_at("name"));
    let version = meta.and_then(|m| m.str_at("version"));

    match (name, version) {
        (Some(name), Some(version)) if name.contains(version) => name.to_string(),
        (Some(name), Some(version)) => format!("{name} {version}"),
        (Some(name), None) => name.to_string(),
        (None, _) => stem.to_string(),
    }
}
