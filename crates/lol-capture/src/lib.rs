use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use lol_state::Side;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Resolution every built-in region is defined against
pub const REFERENCE_WIDTH: u32 = 1920;
pub const REFERENCE_HEIGHT: u32 = 1080;

/// Overlay outline colors
const OWN_COLOR: Rgb<u8> = Rgb([0, 128, 255]);
const OPPOSING_COLOR: Rgb<u8> = Rgb([255, 64, 64]);
const OUTLINE_WIDTH: i32 = 3;

/// Pixel rectangle as (left, top, right, bottom), right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A rectangle on the reference grid, tagged with the team it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRegion {
    pub rect: PixelRect,
    pub side: Side,
}

/// Correction for captures that are offset or stretched relative to the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub dx: i32,
    pub dy: i32,
    pub sx: f64,
    pub sy: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dx: 0,
            dy: 0,
            sx: 1.0,
            sy: 1.0,
        }
    }
}

/// Size and JPEG quality of tiles sent to a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFormat {
    pub size: u32,
    pub quality: u8,
}

/// Champion portraits on the pick screen
pub const PORTRAIT_TILE: TileFormat = TileFormat {
    size: 128,
    quality: 50,
};

/// Rune icons on the loading screen
pub const RUNE_TILE: TileFormat = TileFormat {
    size: 64,
    quality: 90,
};

/// A cropped, encoded region ready for classification
#[derive(Debug, Clone)]
pub struct Tile {
    pub index: usize,
    pub side: Side,
    /// Rectangle in the actual image's pixel space
    pub rect: PixelRect,
    pub bytes: Vec<u8>,
}

/// Well-known regions at the 1920x1080 reference resolution
pub mod layouts {
    use super::{DetectionRegion, PixelRect};
    use lol_state::Side;

    /// Own team portraits down the left edge of the ARAM pick screen
    const PICK_OWN: [PixelRect; 5] = [
        PixelRect::new(83, 157, 175, 248),
        PixelRect::new(83, 277, 175, 368),
        PixelRect::new(83, 397, 175, 488),
        PixelRect::new(83, 517, 175, 608),
        PixelRect::new(83, 637, 175, 728),
    ];

    /// First bench slot; the other nine follow at a fixed stride
    const BENCH_FIRST: PixelRect = PixelRect::new(529, 16, 602, 89);
    const BENCH_STRIDE: i32 = 88;

    /// Champion name banners on the loading screen, top row then bottom row
    const LOADING_NAMES: [PixelRect; 10] = [
        PixelRect::new(243, 407, 487, 433),
        PixelRect::new(539, 407, 783, 433),
        PixelRect::new(834, 407, 1080, 433),
        PixelRect::new(1128, 407, 1375, 433),
        PixelRect::new(1425, 407, 1671, 433),
        PixelRect::new(243, 928, 487, 958),
        PixelRect::new(539, 928, 783, 958),
        PixelRect::new(834, 928, 1080, 958),
        PixelRect::new(1128, 928, 1375, 958),
        PixelRect::new(1425, 928, 1671, 958),
    ];

    /// Keystone rune icons under each loading-screen card
    const LOADING_RUNES: [PixelRect; 10] = [
        PixelRect::new(255, 447, 281, 474),
        PixelRect::new(551, 447, 577, 474),
        PixelRect::new(847, 447, 873, 474),
        PixelRect::new(1144, 447, 1169, 474),
        PixelRect::new(1440, 447, 1466, 474),
        PixelRect::new(255, 971, 281, 999),
        PixelRect::new(551, 971, 577, 999),
        PixelRect::new(847, 971, 873, 999),
        PixelRect::new(1144, 971, 1169, 999),
        PixelRect::new(1440, 971, 1466, 999),
    ];

    /// Pick screen: 5 own portraits, then 10 bench slots
    pub fn pick_screen() -> Vec<DetectionRegion> {
        let own = PICK_OWN.iter().map(|&rect| DetectionRegion {
            rect,
            side: Side::Own,
        });
        let bench = (0..10).map(|i| {
            let dx = BENCH_STRIDE * i;
            DetectionRegion {
                rect: PixelRect::new(
                    BENCH_FIRST.left + dx,
                    BENCH_FIRST.top,
                    BENCH_FIRST.right + dx,
                    BENCH_FIRST.bottom,
                ),
                side: Side::Opposing,
            }
        });
        own.chain(bench).collect()
    }

    pub fn loading_names() -> Vec<DetectionRegion> {
        tag_halves(&LOADING_NAMES)
    }

    pub fn loading_runes() -> Vec<DetectionRegion> {
        tag_halves(&LOADING_RUNES)
    }

    /// Top row is tagged own, bottom row opposing; teams are re-assigned
    /// later once the player's own champion is known.
    fn tag_halves(rects: &[PixelRect]) -> Vec<DetectionRegion> {
        let half = rects.len() / 2;
        rects
            .iter()
            .enumerate()
            .map(|(i, &rect)| DetectionRegion {
                rect,
                side: if i < half { Side::Own } else { Side::Opposing },
            })
            .collect()
    }
}

/// Linearly map a reference rectangle onto an image of the given size.
/// Coordinates are truncated after scaling, then offset.
pub fn scale_rect(rect: &PixelRect, width: u32, height: u32, cal: &Calibration) -> PixelRect {
    let rx = (width as f64 / REFERENCE_WIDTH as f64) * cal.sx;
    let ry = (height as f64 / REFERENCE_HEIGHT as f64) * cal.sy;
    PixelRect {
        left: (rect.left as f64 * rx) as i32 + cal.dx,
        top: (rect.top as f64 * ry) as i32 + cal.dy,
        right: (rect.right as f64 * rx) as i32 + cal.dx,
        bottom: (rect.bottom as f64 * ry) as i32 + cal.dy,
    }
}

pub fn scale_regions(
    regions: &[DetectionRegion],
    width: u32,
    height: u32,
    cal: &Calibration,
) -> Vec<DetectionRegion> {
    regions
        .iter()
        .map(|r| DetectionRegion {
            rect: scale_rect(&r.rect, width, height, cal),
            side: r.side,
        })
        .collect()
}

/// Crop a pixel rectangle out of a frame, clamped to the frame bounds
pub fn crop_rect(frame: &RgbImage, rect: &PixelRect) -> RgbImage {
    let (w, h) = (frame.width() as i32, frame.height() as i32);

    let x = rect.left.clamp(0, w);
    let y = rect.top.clamp(0, h);
    let right = rect.right.clamp(x, w);
    let bottom = rect.bottom.clamp(y, h);

    image::imageops::crop_imm(
        frame,
        x as u32,
        y as u32,
        (right - x) as u32,
        (bottom - y) as u32,
    )
    .to_image()
}

/// Crop, resize to a fixed square and JPEG-encode one region
pub fn encode_tile(frame: &RgbImage, rect: &PixelRect, format: TileFormat) -> Result<Vec<u8>> {
    let crop = crop_rect(frame, rect);
    if crop.width() == 0 || crop.height() == 0 {
        bail!(
            "region ({}, {}, {}, {}) lies outside the {}x{} frame",
            rect.left,
            rect.top,
            rect.right,
            rect.bottom,
            frame.width(),
            frame.height()
        );
    }
    let resized = image::imageops::resize(&crop, format.size, format.size, FilterType::Lanczos3);

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, format.quality)
        .encode_image(&resized)
        .context("Failed to encode tile as JPEG")?;
    Ok(bytes)
}

/// Scale every region to the frame and encode it as a classifier tile.
/// Tiles fail independently, so a region pushed off the frame only costs
/// its own slot.
pub fn extract_tiles(
    frame: &RgbImage,
    regions: &[DetectionRegion],
    cal: &Calibration,
    format: TileFormat,
) -> Vec<Result<Tile>> {
    let scaled = scale_regions(regions, frame.width(), frame.height(), cal);
    let tiles: Vec<Result<Tile>> = scaled
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let bytes = encode_tile(frame, &region.rect, format)
                .with_context(|| format!("Failed to extract tile {}", index))?;
            Ok(Tile {
                index,
                side: region.side,
                rect: region.rect,
                bytes,
            })
        })
        .collect();

    let failed = tiles.iter().filter(|t| t.is_err()).count();
    if failed > 0 {
        warn!(
            "{} of {} region(s) fall outside the {}x{} frame",
            failed,
            tiles.len(),
            frame.width(),
            frame.height()
        );
    }
    debug!(
        "Extracted {} tile(s) from {}x{} frame",
        tiles.len() - failed,
        frame.width(),
        frame.height()
    );
    tiles
}

/// Copy of the frame with every (already scaled) region outlined,
/// own side and opposing side in different colors
pub fn draw_overlay(frame: &RgbImage, regions: &[DetectionRegion]) -> RgbImage {
    let mut out = frame.clone();
    for region in regions {
        let color = match region.side {
            Side::Own => OWN_COLOR,
            Side::Opposing => OPPOSING_COLOR,
        };
        draw_outline(&mut out, &region.rect, color);
    }
    out
}

fn draw_outline(img: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let mut put = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && x < w && y < h {
            img.put_pixel(x as u32, y as u32, color);
        }
    };

    for t in 0..OUTLINE_WIDTH {
        for x in rect.left..=rect.right {
            put(x, rect.top + t);
            put(x, rect.bottom - t);
        }
        for y in rect.top..=rect.bottom {
            put(rect.left + t, y);
            put(rect.right - t, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_screen_regions() {
        let regions = layouts::pick_screen();
        assert_eq!(regions.len(), 15);
        assert!(regions[..5].iter().all(|r| r.side == Side::Own));
        assert!(regions[5..].iter().all(|r| r.side == Side::Opposing));
        assert_eq!(regions[14].rect, PixelRect::new(1321, 16, 1394, 89));
        for r in &regions {
            assert!(r.rect.right <= REFERENCE_WIDTH as i32);
            assert!(r.rect.bottom <= REFERENCE_HEIGHT as i32);
        }
    }

    #[test]
    fn test_scaling_is_linear() {
        let rect = PixelRect::new(83, 157, 175, 248);
        let cal = Calibration::default();
        let same = scale_rect(&rect, 1920, 1080, &cal);
        assert_eq!(same, rect);

        let doubled = scale_rect(&rect, 3840, 2160, &cal);
        assert_eq!(doubled, PixelRect::new(166, 314, 350, 496));
    }

    #[test]
    fn test_equal_scale_preserves_aspect_ratio() {
        let rect = PixelRect::new(200, 100, 400, 200);
        let scaled = scale_rect(&rect, 960, 540, &Calibration::default());
        assert_eq!(scaled.width(), 100);
        assert_eq!(scaled.height(), 50);
    }

    #[test]
    fn test_calibration_offset_and_stretch() {
        let rect = PixelRect::new(100, 100, 200, 200);
        let cal = Calibration {
            dx: 5,
            dy: -3,
            sx: 1.5,
            sy: 1.0,
        };
        let scaled = scale_rect(&rect, 1920, 1080, &cal);
        assert_eq!(scaled, PixelRect::new(155, 97, 305, 197));
    }

    #[test]
    fn test_crop_rect_clamps() {
        let img = RgbImage::new(100, 50);
        let crop = crop_rect(&img, &PixelRect::new(90, 40, 150, 80));
        assert_eq!(crop.dimensions(), (10, 10));
        let crop = crop_rect(&img, &PixelRect::new(-10, -10, 20, 20));
        assert_eq!(crop.dimensions(), (20, 20));
    }

    #[test]
    fn test_encode_tile_is_fixed_size_jpeg() {
        let img = RgbImage::from_fn(1920, 1080, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let bytes = encode_tile(&img, &PixelRect::new(83, 157, 175, 248), PORTRAIT_TILE).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (128, 128));
    }

    #[test]
    fn test_encode_tile_outside_frame_fails() {
        let img = RgbImage::new(10, 10);
        assert!(encode_tile(&img, &PixelRect::new(20, 20, 30, 30), PORTRAIT_TILE).is_err());
    }

    #[test]
    fn test_extract_tiles_keeps_order_and_sides() {
        let img = RgbImage::from_pixel(960, 540, Rgb([40, 40, 40]));
        let tiles: Vec<Tile> = extract_tiles(
            &img,
            &layouts::pick_screen(),
            &Calibration::default(),
            PORTRAIT_TILE,
        )
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();
        assert_eq!(tiles.len(), 15);
        assert_eq!(tiles[0].rect, PixelRect::new(41, 78, 87, 124));
        assert_eq!(tiles[7].index, 7);
        assert_eq!(tiles[7].side, Side::Opposing);
    }

    #[test]
    fn test_offset_tiles_fail_alone() {
        let img = RgbImage::from_pixel(1920, 1080, Rgb([40, 40, 40]));
        let cal = Calibration {
            dx: 700,
            ..Calibration::default()
        };
        let tiles = extract_tiles(&img, &layouts::pick_screen(), &cal, PORTRAIT_TILE);
        assert_eq!(tiles.len(), 15);
        assert!(tiles[..13].iter().all(|t| t.is_ok()));
        let err = tiles[13].as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("tile 13"));
        assert!(tiles[14].is_err());
    }

    #[test]
    fn test_overlay_colors_by_side() {
        let img = RgbImage::new(50, 50);
        let regions = [
            DetectionRegion {
                rect: PixelRect::new(5, 5, 20, 20),
                side: Side::Own,
            },
            DetectionRegion {
                rect: PixelRect::new(25, 25, 45, 45),
                side: Side::Opposing,
            },
        ];
        let out = draw_overlay(&img, &regions);
        assert_eq!(*out.get_pixel(5, 5), OWN_COLOR);
        assert_eq!(*out.get_pixel(25, 30), OPPOSING_COLOR);
        assert_eq!(*out.get_pixel(12, 12), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(5, 5), Rgb([0, 0, 0]));
    }
}
