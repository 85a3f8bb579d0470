//! The top-level parsing pipeline.

use std::path::Path;

use springmap_archive::{extract, locate_map_files, MapFiles};
use springmap_common::Raster;
use springmap_dds::{equirectangular, CubeMap, DdsTexture};
use springmap_meta::{parse_mapinfo, parse_smd, Value};
use springmap_smf::SmfMap;
use springmap_smt::{build_texture, TileCatalog};
use tracing::{debug, info, warn};

use crate::map::derive_script_name;
use crate::resources::load_resources;
use crate::water::{apply_water, WaterParams};
use crate::{Error, Map, ParseOptions, Result};

/// Parse a `.sd7`/`.sdz` map archive into a [`Map`].
///
/// The archive is extracted into a temporary directory that is removed on
/// every exit path before the result, success or error, reaches the
/// caller.
pub fn parse_map<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Map> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("map")
        .to_string();

    let extracted = extract(path).map_err(|e| match e {
        springmap_archive::Error::UnrecognizedSuffix(_) => {
            Error::NotASpringArchive(path.display().to_string())
        }
        other => Error::Archive(other),
    })?;

    let result = parse_extracted(extracted.path(), &stem, options);
    // Cleanup runs before the result is surfaced; failures are logged
    // inside close() and never mask the parse outcome.
    extracted.close();
    result
}

fn parse_extracted(root: &Path, stem: &str, options: &ParseOptions) -> Result<Map> {
    let files = locate_map_files(root)?;

    // Metadata first; failures here only cost the dictionary.
    let meta = files
        .mapinfo
        .as_deref()
        .and_then(|path| read_metadata(path, parse_mapinfo));
    let smd = files
        .smd
        .as_deref()
        .and_then(|path| read_metadata(path, |bytes| Ok(parse_smd(bytes))));

    let smf_path = files.smf.as_deref().ok_or(Error::MissingSmf)?;
    let smf = SmfMap::parse(&std::fs::read(smf_path)?)?;
    progress(
        options.verbose,
        format_args!(
            "parsed {}: {}x{} px",
            smf_path.display(),
            smf.header.map_width,
            smf.header.map_height
        ),
    );

    let texture = if options.skip_smt {
        debug!("texture mosaic skipped");
        None
    } else {
        Some(build_map_texture(&files, &smf, options)?)
    };

    let skybox = if options.parse_skybox {
        build_skybox(meta.as_ref(), &files, options.skybox_width)?
    } else {
        None
    };

    let resources = if options.parse_resources {
        Some(load_resources(
            meta.as_ref(),
            &files,
            options.resources.as_deref(),
        ))
    } else {
        None
    };

    let script_name = derive_script_name(meta.as_ref(), stem);
    progress(
        options.verbose,
        format_args!("assembled map '{script_name}'"),
    );

    Ok(Map {
        file_name: stem.to_string(),
        script_name,
        min_height: smf.header.min_depth,
        max_height: smf.header.max_depth,
        meta,
        smd,
        header: smf.header.clone(),
        height_values: smf.height_values,
        height_map: smf.height_map,
        type_map: smf.type_map,
        metal_map: smf.metal_map,
        mini_map: smf.mini_map,
        texture,
        resources,
        skybox,
    })
}

/// Decode the SMT catalogue, assemble the mosaic, and tint the water.
fn build_map_texture(files: &MapFiles, smf: &SmfMap, options: &ParseOptions) -> Result<Raster> {
    let smt_path = files.smt.as_deref().ok_or(Error::MissingSmt)?;
    let catalog = TileCatalog::decode(&std::fs::read(smt_path)?, options.mipmap_size)?;
    if catalog.failed_tiles() > 0 {
        warn!(failed = catalog.failed_tiles(), "tile decode failures");
    }

    let mut texture = build_texture(
        &catalog,
        &smf.tile_index.indices,
        smf.header.map_width_units,
        smf.header.map_height_units,
    );

    if options.water {
        let params = WaterParams {
            color: options.water_color,
            modifier: options.water_modifier,
        };
        apply_water(&mut texture, smf, options.mipmap_size, &params);
    }

    Ok(texture)
}

/// Find and reproject the skybox cubemap, if the archive carries one.
///
/// The mapinfo `atmosphere.skyBox` entry names the preferred resource;
/// without one, the first `.dds` whose caps declare a cubemap is used.
fn build_skybox(meta: Option<&Value>, files: &MapFiles, width: u32) -> Result<Option<Raster>> {
    if let Some(name) = meta.and_then(|m| m.str_at("atmosphere.skyBox")) {
        let base_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if let Some(path) = files.find_resource(base_name) {
            info!(skybox = %path.display(), "reprojecting declared skybox");
            let cube = CubeMap::parse(&std::fs::read(path)?)?;
            return Ok(Some(equirectangular(&cube, width)));
        }
        warn!(name, "declared skybox not found in archive");
    }

    for path in &files.dds {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        let is_cubemap = DdsTexture::parse(&data)
            .map(|t| t.is_cubemap())
            .unwrap_or(false);
        if is_cubemap {
            info!(skybox = %path.display(), "reprojecting discovered skybox");
            let cube = CubeMap::parse(&data)?;
            return Ok(Some(equirectangular(&cube, width)));
        }
    }

    Ok(None)
}

/// Read and parse a metadata file; any failure is logged and yields
/// `None` rather than failing the map.
fn read_metadata<F>(path: &Path, parse: F) -> Option<Value>
where
    F: FnOnce(&[u8]) -> springmap_meta::Result<Value>,
{
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), "metadata unreadable: {e}");
            return None;
        }
    };
    match parse(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), "metadata parse failed: {e}");
            None
        }
    }
}

/// Progress lines are promoted to `info` when the verbose option is set.
fn progress(verbose: bool, args: std::fmt::Arguments<'_>) {
    if verbose {
        info!("{args}");
    } else {
        debug!("{args}");
    }
}
