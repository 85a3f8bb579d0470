//! Springmap CLI - render SpringRTS map archives to images and summaries.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use springmap::prelude::*;

/// Springmap - SpringRTS map archive parser
#[derive(Parser)]
#[command(name = "springmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit progress and diagnostic logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a map archive and write its layers as PNG images
    Parse {
        /// Path to the .sd7/.sdz archive
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Per-tile texture resolution (4, 8, 16 or 32)
        #[arg(long, default_value_t = 4)]
        mipmap_size: u32,

        /// Skip the texture mosaic entirely
        #[arg(long)]
        skip_texture: bool,

        /// Leave sub-sea-level texture untinted
        #[arg(long)]
        no_water: bool,

        /// Reproject the skybox cubemap, when the archive has one
        #[arg(long)]
        skybox: bool,

        /// Load mapinfo resource images
        #[arg(long)]
        resources: bool,

        /// Restrict resource loading to specific keys (repeatable)
        #[arg(long = "resource")]
        resource_keys: Vec<String>,
    },

    /// Print the map header and metadata summary
    Info {
        /// Path to the .sd7/.sdz archive
        archive: PathBuf,
    },

    /// Reproject the skybox cubemap to an equirectangular PNG
    Skybox {
        /// Path to the .sd7/.sdz archive
        archive: PathBuf,

        /// Output PNG file
        #[arg(short, long, default_value = "skybox.png")]
        output: PathBuf,

        /// Panorama width in pixels (height is half)
        #[arg(long, default_value_t = 1024)]
        width: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            archive,
            output,
            mipmap_size,
            skip_texture,
            no_water,
            skybox,
            resources,
            resource_keys,
        } => cmd_parse(
            &archive,
            &output,
            ParseArgs {
                verbose: cli.verbose,
                mipmap_size,
                skip_texture,
                no_water,
                skybox,
                resources,
                resource_keys,
            },
        ),
        Commands::Info { archive } => cmd_info(&archive, cli.verbose),
        Commands::Skybox {
            archive,
            output,
            width,
        } => cmd_skybox(&archive, &output, width, cli.verbose),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

struct ParseArgs {
    verbose: bool,
    mipmap_size: u32,
    skip_texture: bool,
    no_water: bool,
    skybox: bool,
    resources: bool,
    resource_keys: Vec<String>,
}

fn cmd_parse(archive: &Path, output: &Path, args: ParseArgs) -> Result<()> {
    let mipmap_size = MipLevel::from_side(args.mipmap_size)
        .with_context(|| format!("mipmap size must be 4, 8, 16 or 32, got {}", args.mipmap_size))?;

    let options = ParseOptions {
        verbose: args.verbose,
        mipmap_size,
        skip_smt: args.skip_texture,
        water: !args.no_water,
        parse_resources: args.resources,
        resources: (!args.resource_keys.is_empty()).then_some(args.resource_keys),
        parse_skybox: args.skybox,
        ..Default::default()
    };

    println!("Parsing map archive: {}", archive.display());
    let start = Instant::now();
    let map = springmap::parse_map(archive, &options).context("Failed to parse map archive")?;
    println!(
        "Parsed '{}' ({}x{} px) in {:?}",
        map.script_name,
        map.header.map_width,
        map.header.map_height,
        start.elapsed()
    );

    std::fs::create_dir_all(output)?;

    let mut layers: Vec<(String, &Raster)> = vec![
        ("height".to_string(), &map.height_map),
        ("type".to_string(), &map.type_map),
        ("metal".to_string(), &map.metal_map),
        ("mini".to_string(), &map.mini_map),
    ];
    if let Some(texture) = &map.texture {
        layers.push(("texture".to_string(), texture));
    }
    if let Some(skybox) = &map.skybox {
        layers.push(("skybox".to_string(), skybox));
    }
    if let Some(resources) = &map.resources {
        for (key, raster) in resources {
            layers.push((format!("resource_{key}"), raster));
        }
    }

    let pb = ProgressBar::new(layers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for (name, raster) in &layers {
        pb.set_message(name.clone());
        let path = output.join(format!("{name}.png"));
        save_png(raster, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    println!("Wrote {} layers to {}", layers.len(), output.display());
    Ok(())
}

fn cmd_info(archive: &Path, verbose: bool) -> Result<()> {
    let options = ParseOptions {
        verbose,
        skip_smt: true,
        ..Default::default()
    };
    let map = springmap::parse_map(archive, &options).context("Failed to parse map archive")?;

    println!("Map:        {}", map.script_name);
    println!("File:       {}", map.file_name);
    println!(
        "Size:       {}x{} px ({}x{} map units)",
        map.header.map_width,
        map.header.map_height,
        map.header.map_width_units,
        map.header.map_height_units
    );
    println!(
        "Elevation:  {:.1} to {:.1} (square size {})",
        map.min_height, map.max_height, map.header.square_size
    );
    let (lo, hi) = map
        .height_values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    println!(
        "Terrain:    {:.1} to {:.1} observed",
        map.header.elevation(lo),
        map.header.elevation(hi)
    );
    println!("Version:    {} (id {:#010x})", map.header.version, map.header.id);

    if !map.header.extra_headers.is_empty() {
        println!("Extra headers:");
        for extra in &map.header.extra_headers {
            println!("  type {} ({} bytes)", extra.header_type, extra.size);
        }
    }

    if let Some(meta) = &map.meta {
        println!("mapinfo.lua:");
        for key in ["name", "version", "description", "author"] {
            if let Some(value) = meta.str_at(key) {
                println!("  {key}: {value}");
            }
        }
        if let Some(radius) = meta.f64_at("extractorRadius") {
            println!("  extractorRadius: {radius}");
        }
    }

    let positions = map.start_positions();
    if !positions.is_empty() {
        println!("Start positions:");
        for (i, (x, z)) in positions.iter().enumerate() {
            println!("  {i}: ({x}, {z})");
        }
    }

    Ok(())
}

fn cmd_skybox(archive: &Path, output: &Path, width: u32, verbose: bool) -> Result<()> {
    let options = ParseOptions {
        verbose,
        skip_smt: true,
        parse_skybox: true,
        skybox_width: width,
        ..Default::default()
    };
    let map = springmap::parse_map(archive, &options).context("Failed to parse map archive")?;

    let Some(skybox) = &map.skybox else {
        bail!("archive has no cubemap skybox resource");
    };

    save_png(skybox, output).with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {}x{} panorama to {}",
        skybox.width(),
        skybox.height(),
        output.display()
    );
    Ok(())
}

/// Encode a raster as PNG via the image crate.
fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(
        raster.width(),
        raster.height(),
        raster.data().to_vec(),
    )
    .context("raster buffer does not match its dimensions")?;
    image.save(path)?;
    Ok(())
}
