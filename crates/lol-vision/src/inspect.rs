use anyhow::{Context, Result};
use image::RgbImage;
use lol_capture::{
    draw_overlay, extract_tiles, layouts, scale_regions, Calibration, PORTRAIT_TILE, RUNE_TILE,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Write overlays of both screen layouts plus every encoded tile, so region
/// placement can be checked by eye. Regions that fall off the frame are
/// skipped. Returns the files written.
pub fn export_layout(frame: &RgbImage, cal: &Calibration, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let (w, h) = frame.dimensions();
    let mut written = Vec::new();

    let pick = layouts::pick_screen();
    let mut loading = layouts::loading_names();
    loading.extend(layouts::loading_runes());

    for (name, regions, cal) in [
        ("pick_overlay.png", &pick, *cal),
        ("loading_overlay.png", &loading, Calibration::default()),
    ] {
        let path = out_dir.join(name);
        draw_overlay(frame, &scale_regions(regions, w, h, &cal))
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    let tile_sets = [
        ("pick", extract_tiles(frame, &pick, cal, PORTRAIT_TILE)),
        (
            "rune",
            extract_tiles(frame, &layouts::loading_runes(), &Calibration::default(), RUNE_TILE),
        ),
    ];
    for (prefix, tiles) in tile_sets {
        for tile in tiles {
            let tile = match tile {
                Ok(tile) => tile,
                Err(e) => {
                    warn!("Skipping {} tile: {:#}", prefix, e);
                    continue;
                }
            };
            let path = out_dir.join(format!("{}_{:02}.jpg", prefix, tile.index));
            std::fs::write(&path, &tile.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
    }

    info!("Wrote {} layout file(s) to {}", written.len(), out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_layout_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let frame = RgbImage::from_pixel(960, 540, image::Rgb([40, 40, 40]));
        let files = export_layout(&frame, &Calibration::default(), dir.path()).unwrap();
        // 2 overlays + 15 portraits + 10 runes
        assert_eq!(files.len(), 27);
        assert!(files.iter().all(|f| f.exists()));
    }

    #[test]
    fn test_export_layout_skips_offset_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let frame = RgbImage::from_pixel(1920, 1080, image::Rgb([40, 40, 40]));
        let cal = Calibration {
            dx: 700,
            ..Calibration::default()
        };
        let files = export_layout(&frame, &cal, dir.path()).unwrap();
        // bench slots 8 and 9 land past the right edge
        assert_eq!(files.len(), 25);
        assert!(!dir.path().join("pick_13.jpg").exists());
        assert!(dir.path().join("pick_12.jpg").exists());
    }
}
