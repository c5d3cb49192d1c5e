//! docrectify - crop a photographed document to an upright rectangle
//!
//! Reads a photo, takes the four document corners from the command line or
//! from the configuration file, and writes the rectified page.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use docrectify::config::Config;
use docrectify::{quad, rectify_with, CropError, PixelBuffer, Point, Quad};

/// docrectify - perspective crop for photographed documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image (PNG or JPEG)
    input: PathBuf,

    /// Output image; format follows the extension
    output: PathBuf,

    /// Document corners in source pixels: TL TR BR BL, each as X,Y
    #[arg(long, num_args = 4, value_name = "X,Y", allow_hyphen_values = true)]
    corners: Option<Vec<Point>>,

    /// Configuration file path
    #[arg(short, long, default_value = "docrectify.toml")]
    config: PathBuf,

    /// Resample on a single thread
    #[arg(long)]
    sequential: bool,

    /// Store the corners used for this crop back into the config file
    #[arg(long)]
    save_corners: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("docrectify v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_create(&args.config)?;
    if args.sequential {
        config.rectify.parallel = false;
    }

    let source = load_image(&args.input)?;
    let (width, height) = (source.width(), source.height());
    info!("Source: {:?} ({}x{})", args.input, width, height);

    let quad = match &args.corners {
        Some(points) => match points.as_slice() {
            [tl, tr, br, bl] => Quad::new(*tl, *tr, *br, *bl),
            _ => bail!("--corners takes exactly four X,Y points"),
        },
        None => config.crop.source_corners(width, height),
    };
    info!("Corners: {:?}", quad.corners);

    if let Err(defect) = quad::check(&quad) {
        bail!("Corners do not form a usable quadrilateral ({:?}); adjust the corners", defect);
    }

    let start = Instant::now();
    let page = match rectify_with(&source, &quad, &config.rectify, None) {
        Ok(page) => page,
        Err(CropError::InvalidQuad) => bail!("Invalid quadrilateral; adjust the corners"),
        Err(e) => return Err(e).context("Rectification failed"),
    };
    info!(
        "Rectified to {}x{} in {:.1} ms",
        page.width(),
        page.height(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    save_image(page, &args.output)?;
    info!("Wrote {:?}", args.output);

    if args.save_corners && args.corners.is_some() {
        config.crop.set_from_pixels(&quad, width, height);
        config.save(&args.config)?;
    }

    Ok(())
}

/// Decode an image file into an RGBA buffer
fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {:?}", path))?
        .to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        bail!("Image {:?} is empty", path);
    }
    PixelBuffer::try_from(img).with_context(|| format!("Image {:?} is not a usable RGBA raster", path))
}

/// Encode the rectified page; JPEG has no alpha so it is written as RGB
fn save_image(page: PixelBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::try_from(page).context("Rectified page is not a valid RGBA raster")?;

    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        image::DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save(path)
            .with_context(|| format!("Failed to write {:?}", path))
    } else {
        rgba.save(path)
            .with_context(|| format!("Failed to write {:?}", path))
    }
}
