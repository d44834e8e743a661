//! Dump region overlays and tiles of a saved screenshot for layout checks.
//! Usage:
//! cargo run -p lol-vision --features cli --bin analyze_frame -- <screenshot.png> [output_dir]

use anyhow::{Context, Result};
use lol_capture::Calibration;
use std::path::PathBuf;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./debug_output"));

    println!("Loading image: {}", input_path.display());
    let img = image::open(&input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?
        .to_rgb8();
    println!("Image size: {}x{}", img.width(), img.height());

    let files = lol_vision::export_layout(&img, &Calibration::default(), &output_dir)?;
    for f in &files {
        println!("  {}", f.display());
    }
    println!("\nDebug images saved to: {}", output_dir.display());
    Ok(())
}
