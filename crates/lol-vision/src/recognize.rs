use crate::classifier::{classify, RetryPolicy, TileClassifier};
use crate::ocr::{encode_png, preprocess_for_ocr, TextDetector};
use crate::resolver::EntityResolver;
use anyhow::{anyhow, bail, Context, Result};
use image::RgbImage;
use lol_capture::{
    crop_rect, extract_tiles, layouts, scale_regions, Calibration, Tile, PORTRAIT_TILE, RUNE_TILE,
};
use lol_data::{AliasTable, RuneRoles};
use lol_state::{roles, DraftState, PickTriple, RecognitionResult, BENCH_SIZE, ROSTER_SIZE};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Default acceptance threshold for champion portraits, percent
pub const PORTRAIT_THRESHOLD: f64 = 50.0;

/// Acceptance threshold for rune icons, percent
pub const RUNE_THRESHOLD: f64 = 35.0;

/// Classify every tile in parallel. Output order matches `tiles`; a tile
/// that could not be extracted, or whose retries are exhausted, becomes a
/// failed, undetected result.
pub fn classify_tiles(
    classifier: &dyn TileClassifier,
    tiles: &[Result<Tile>],
    policy: &RetryPolicy,
) -> Vec<RecognitionResult> {
    tiles
        .par_iter()
        .enumerate()
        .map(|(i, tile)| {
            let tile = match tile {
                Ok(tile) => tile,
                Err(e) => {
                    warn!("Tile {} skipped: {:#}", i, e);
                    return RecognitionResult::failed(format!("{:#}", e));
                }
            };
            classify_tile(classifier, tile, policy)
        })
        .collect()
}

fn classify_tile(
    classifier: &dyn TileClassifier,
    tile: &Tile,
    policy: &RetryPolicy,
) -> RecognitionResult {
    match classify(classifier, &tile.bytes, policy) {
        Ok(c) => {
            debug!("Tile {}: {:?} ({:.1}%)", tile.index, c.label, c.confidence);
            RecognitionResult {
                label: c.label,
                confidence: c.confidence,
                ..RecognitionResult::default()
            }
        }
        Err(e) => {
            warn!("Tile {} undetected: {:#}", tile.index, e);
            RecognitionResult::failed(format!("{:#}", e))
        }
    }
}

/// Blank out results below `threshold` percent
pub fn apply_threshold(mut result: RecognitionResult, threshold: f64) -> RecognitionResult {
    if result.confidence < threshold {
        result.label = None;
        result.confidence = 0.0;
    }
    result
}

/// Raw per-slot results of one pick-screen capture
#[derive(Debug, Clone, Default)]
pub struct PickScreen {
    /// Own picks that cleared the threshold
    pub own: Vec<RecognitionResult>,
    /// Always ten slots; unusable ones have no label
    pub bench: Vec<RecognitionResult>,
}

impl PickScreen {
    /// Resolve labels into a draft state
    pub fn to_draft(&self, resolver: &EntityResolver) -> DraftState {
        let current = resolver.resolve(
            self.own.iter().filter_map(|r| r.label.as_deref()),
            ROSTER_SIZE,
        );
        let bench = resolver.resolve(
            self.bench.iter().filter_map(|r| r.label.as_deref()),
            BENCH_SIZE,
        );
        info!("Detected {} pick(s), {} bench champion(s)", current.len(), bench.len());
        DraftState {
            current,
            bench,
            detection_available: true,
        }
    }
}

pub fn recognize_pick_screen(
    frame: &RgbImage,
    classifier: &dyn TileClassifier,
    threshold: f64,
    calibration: &Calibration,
    policy: &RetryPolicy,
) -> Result<PickScreen> {
    let tiles = extract_tiles(frame, &layouts::pick_screen(), calibration, PORTRAIT_TILE);
    let results = classify_tiles(classifier, &tiles, policy);

    let mut screen = PickScreen::default();
    for (i, result) in results.into_iter().enumerate() {
        let result = apply_threshold(result, threshold);
        if i < ROSTER_SIZE {
            if result.is_detected() {
                screen.own.push(result);
            }
        } else {
            let denied = result
                .label
                .as_deref()
                .is_some_and(EntityResolver::is_denied);
            screen.bench.push(if denied {
                RecognitionResult::undetected()
            } else {
                result
            });
        }
    }
    Ok(screen)
}

/// Read the ten loading-screen cards: champion name by OCR, keystone rune by
/// classification. Slot order is top row then bottom row.
pub fn recognize_loading_screen(
    frame: &RgbImage,
    detector: &dyn TextDetector,
    rune_classifier: &dyn TileClassifier,
    resolver: &EntityResolver,
    aliases: &AliasTable,
    policy: &RetryPolicy,
) -> Result<Vec<RecognitionResult>> {
    let cal = Calibration::default();
    let names = scale_regions(&layouts::loading_names(), frame.width(), frame.height(), &cal);
    let name_tiles: Vec<Result<Vec<u8>>> = names
        .iter()
        .enumerate()
        .map(|(slot, r)| {
            encode_png(&preprocess_for_ocr(&crop_rect(frame, &r.rect)))
                .with_context(|| format!("Failed to crop name banner {}", slot))
        })
        .collect();

    let rune_tiles = extract_tiles(frame, &layouts::loading_runes(), &cal, RUNE_TILE);
    let runes = classify_tiles(rune_classifier, &rune_tiles, policy);

    let results: Vec<RecognitionResult> = name_tiles
        .par_iter()
        .zip(runes.into_par_iter())
        .enumerate()
        .map(|(slot, (png, rune))| {
            let rune = apply_threshold(rune, RUNE_THRESHOLD);
            let rune_error = rune.error.map(|e| format!("rune: {}", e));
            if let Some(e) = &rune_error {
                warn!("Card {} {}", slot, e);
            }
            let rune = rune.label.map(|r| aliases.rune(&r).to_string());

            let text = match png {
                Ok(png) => policy.run("text detection", || detector.detect_text(png)),
                Err(e) => Err(anyhow!("{:#}", e)),
            };
            match text {
                Ok(text) => {
                    let (name, matched) = resolver.match_ocr_text(&text);
                    debug!("Card {}: '{}' -> '{}' rune {:?}", slot, text, name, rune);
                    RecognitionResult {
                        label: (!name.is_empty()).then_some(name),
                        confidence: if matched { 100.0 } else { 0.0 },
                        secondary: rune,
                        error: rune_error,
                    }
                }
                Err(e) => {
                    warn!("Card {} unreadable: {:#}", slot, e);
                    let error = match rune_error {
                        Some(rune_error) => format!("{:#}; {}", e, rune_error),
                        None => format!("{:#}", e),
                    };
                    RecognitionResult {
                        secondary: rune,
                        ..RecognitionResult::failed(error)
                    }
                }
            }
        })
        .collect();
    Ok(results)
}

/// Split ten loading-screen cards into (own, opposing) triples. The half
/// holding `my_champion` is the own team.
pub fn split_teams(
    cards: &[RecognitionResult],
    my_champion: &str,
    rune_roles: &RuneRoles,
) -> Result<(Vec<PickTriple>, Vec<PickTriple>)> {
    let labels: Vec<&str> = cards.iter().map(|c| c.label.as_deref().unwrap_or("")).collect();
    let Some(mine) = labels.iter().position(|l| *l == my_champion) else {
        bail!(
            "'{}' is not among the recognized champions: [{}]",
            my_champion,
            labels.join(", ")
        );
    };

    let half = cards.len().min(2 * ROSTER_SIZE) / 2;
    let (top, bottom) = cards.split_at(half);
    let (own, opposing) = if mine < half { (top, bottom) } else { (bottom, top) };

    let triples = |side: &[RecognitionResult]| -> Vec<PickTriple> {
        side.iter()
            .take(ROSTER_SIZE)
            .map(|card| {
                let champion = card.label.clone().unwrap_or_default();
                let role = card
                    .secondary
                    .as_deref()
                    .and_then(|rune| rune_roles.role(&champion, rune))
                    .unwrap_or(roles::UNKNOWN)
                    .to_string();
                PickTriple {
                    champion,
                    rune: card.secondary.clone(),
                    role,
                }
            })
            .collect()
    };
    Ok((triples(own), triples(opposing)))
}
