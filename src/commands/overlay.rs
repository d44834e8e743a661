use anyhow::Result;
use lol_capture::Calibration;
use std::path::Path;

use super::open_capture;

pub fn run(image: &Path, out_dir: &Path, calibration: &Calibration) -> Result<()> {
    let frame = open_capture(image)?;
    println!("Image size: {}x{}", frame.width(), frame.height());
    let files = lol_vision::export_layout(&frame, calibration, out_dir)?;
    println!("Wrote {} file(s) to {}", files.len(), out_dir.display());
    Ok(())
}
