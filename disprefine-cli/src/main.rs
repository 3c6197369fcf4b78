use clap::Parser;
use disprefine::image::io::{load_gray_image, save_gray_tile};
use disprefine::{
    BoxBlurFilter, CropView, Disparity, ImageBuf, Region, SharedSource, SubpixelConfig,
    SubpixelMode, SubpixelView, Tile, TileSource, Vec2i,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str = r#"{
  "left_path": "left.png",
  "right_path": "right.png",
  "output_path": "refined.png",
  "seed": { "dx": 0, "dy": 0 },
  "roi": null,
  "refine": {
    "mode": "parabola",
    "kernel_width": 5,
    "kernel_height": 5,
    "horizontal": true,
    "vertical": false,
    "blur_radius": 1,
    "verbose": false
  },
  "tile_size": 64,
  "parallel": false
}"#;

#[derive(Parser, Debug)]
#[command(author, version, about = "DispRefine CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for per-tile diagnostics.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    Parabola,
    Affine,
    BayesianAffine,
    BayesianEmAffine,
}

impl From<ModeConfig> for SubpixelMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::Parabola => SubpixelMode::Parabola,
            ModeConfig::Affine => SubpixelMode::Affine,
            ModeConfig::BayesianAffine => SubpixelMode::BayesianAffine,
            ModeConfig::BayesianEmAffine => SubpixelMode::BayesianEmAffine,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
struct SeedConfig {
    dx: i32,
    dy: i32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct RoiConfig {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
struct RefineConfigJson {
    mode: ModeConfig,
    kernel_width: i32,
    kernel_height: i32,
    horizontal: bool,
    vertical: bool,
    blur_radius: i32,
    verbose: bool,
}

impl Default for RefineConfigJson {
    fn default() -> Self {
        let cfg = SubpixelConfig::default();
        Self {
            mode: ModeConfig::Parabola,
            kernel_width: cfg.kernel_width,
            kernel_height: cfg.kernel_height,
            horizontal: cfg.do_horizontal,
            vertical: cfg.do_vertical,
            blur_radius: 1,
            verbose: cfg.verbose,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    output_path: String,
    seed: SeedConfig,
    roi: Option<RoiConfig>,
    refine: RefineConfigJson,
    tile_size: i32,
    parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_path: String::new(),
            right_path: String::new(),
            output_path: "refined.png".to_string(),
            seed: SeedConfig::default(),
            roi: None,
            refine: RefineConfigJson::default(),
            tile_size: 64,
            parallel: false,
        }
    }
}

/// Wraps an image source as a shared handle, optionally restricted to an ROI.
fn shared_image(img: ImageBuf<f32>, roi: Option<RoiConfig>) -> SharedSource<f32> {
    match roi {
        Some(r) => Arc::new(CropView::new(
            img,
            Region::from_size(Vec2i::new(r.x, r.y), Vec2i::new(r.width, r.height)),
        )),
        None => Arc::new(img),
    }
}

fn refine_map(
    view: &SubpixelView<BoxBlurFilter>,
    tile_size: i32,
    parallel: bool,
) -> disprefine::DispRefineResult<Tile<Disparity>> {
    let full = view.shape().bounds();
    let block = Vec2i::new(tile_size, tile_size);
    if parallel {
        disprefine::rasterize_par(view, full, block)
    } else {
        disprefine::rasterize(view, full, block)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("disprefine=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }
    if config.tile_size < 1 {
        return Err("tile_size must be at least 1".into());
    }

    let left = shared_image(load_gray_image(&config.left_path)?, config.roi);
    let right = shared_image(load_gray_image(&config.right_path)?, config.roi);

    let shape = left.shape();
    let seed: SharedSource<Disparity> = Arc::new(ImageBuf::filled(
        shape.cols,
        shape.rows,
        Disparity::new(config.seed.dx as f32, config.seed.dy as f32),
    )?);

    let view = SubpixelView::new(
        seed,
        left,
        right,
        SubpixelConfig {
            kernel_width: config.refine.kernel_width,
            kernel_height: config.refine.kernel_height,
            do_horizontal: config.refine.horizontal,
            do_vertical: config.refine.vertical,
            mode: config.refine.mode.into(),
            verbose: config.refine.verbose,
        },
        BoxBlurFilter::new(config.refine.blur_radius),
    )?;

    let refined = refine_map(&view, config.tile_size, config.parallel)?;

    // Render horizontal offsets; missing pixels map to the low end.
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for d in refined.data() {
        if !d.is_missing() {
            lo = lo.min(d.h());
            hi = hi.max(d.h());
        }
    }
    if !lo.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    let mut gray = Tile::filled(refined.region(), lo)?;
    for y in refined.region().min().y..refined.region().max().y {
        for x in refined.region().min().x..refined.region().max().x {
            let d = refined.at(x, y);
            if !d.is_missing() {
                gray.set(x, y, d.h());
            }
        }
    }
    save_gray_tile(&config.output_path, &gray, lo, hi)?;

    let valid = refined.data().iter().filter(|d| !d.is_missing()).count();
    println!(
        "refined {}x{} map ({} valid pixels) -> {}",
        refined.width(),
        refined.height(),
        valid,
        config.output_path
    );

    Ok(())
}
