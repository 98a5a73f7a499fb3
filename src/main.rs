// Example runner: samples an object's colors from a reference image and follows it
// through a sequence of still frames, printing the window centre per frame.

use anyhow::{Context, Result};
use chroma_locator::core_modules::utils::image_helper::{load_rgb, pixel_view, save_density};
use chroma_locator::{ColorTracker, Region, TrackerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Track a colored object across image frames with histogram back-projection
/// and mean-shift.
#[derive(Parser, Debug)]
#[command(name = "chroma_locator")]
struct Args {
    /// Reference image the object is sampled from
    #[arg(short, long)]
    sample: PathBuf,

    /// Object region in the reference image: x,y,width,height
    #[arg(short, long, value_parser = parse_region)]
    region: Region,

    /// Restrict back-projection to this area of each frame: x,y,width,height
    #[arg(long, value_parser = parse_region)]
    search: Option<Region>,

    /// Vertical growth of the search area on each side, in pixels
    #[arg(long, default_value_t = 0)]
    margin: usize,

    /// Mean-shift iterations per frame
    #[arg(short, long, default_value_t = chroma_locator::pipeline::DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Write the last frame's density map to this PNG
    #[arg(long)]
    dump_density: Option<PathBuf>,

    /// Frames to track through, in order
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

fn parse_region(text: &str) -> Result<Region, String> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region '{text}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Region::new(*x, *y, *w, *h)),
        _ => Err(format!("region '{text}' must be x,y,width,height")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = TrackerConfig {
        iterations: args.iterations,
        search_region: args.search,
        search_margin: (0, args.margin),
    };

    let reference = load_rgb(&args.sample)
        .with_context(|| format!("loading sample image {}", args.sample.display()))?;
    let mut tracker = ColorTracker::<u16>::from_sample(&pixel_view(&reference), args.region, config)
        .context("sampling object histogram")?;
    info!(region = ?args.region, "object sampled");

    for path in &args.frames {
        let frame = load_rgb(path).with_context(|| format!("loading frame {}", path.display()))?;
        let (cx, cy) = tracker
            .update(&pixel_view(&frame))
            .with_context(|| format!("tracking in {}", path.display()))?;
        println!("{}\t{cx}\t{cy}", path.display());
    }

    if let (Some(out), Some(density)) = (&args.dump_density, tracker.last_density()) {
        save_density(out, density).with_context(|| format!("writing {}", out.display()))?;
        info!(path = %out.display(), "density map written");
    }

    info!(frames = tracker.frames_seen(), window = ?tracker.window(), "tracking complete");
    Ok(())
}
