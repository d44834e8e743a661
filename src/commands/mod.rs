mod builds;
mod overlay;
mod pick;
mod train;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::RgbImage;
use lol_capture::Calibration;
use lol_model::TrainParams;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

pub use builds::parse_enemy;

#[derive(Parser)]
#[command(name = "draft-advisor")]
#[command(about = "ARAM draft and item build advisor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the win-rate model bundle from the historical dataset
    Train {
        /// Dataset CSV (defaults to DRAFT_DATASET_PATH)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Bundle output, .json or .msgpack (defaults to DRAFT_MODEL_PATH)
        #[arg(long)]
        out: Option<PathBuf>,

        /// L-BFGS iteration cap per classifier
        #[arg(long, default_value_t = 200)]
        max_iterations: u64,

        #[arg(long, default_value_t = 1e-2)]
        l2: f64,
    },

    /// Score a roster and suggest the best bench swap
    Pick {
        /// Pick-screen capture to detect champions from
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Five champions, comma separated; overrides detection
        #[arg(long, value_delimiter = ',')]
        roster: Vec<String>,

        /// Swap candidates, comma separated; overrides the detected bench
        #[arg(long, value_delimiter = ',')]
        bench: Vec<String>,

        /// Champion to swap out
        #[arg(long)]
        replace: Option<String>,

        #[command(flatten)]
        calibration: CalibrationArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recommend item builds against the enemy composition
    Builds {
        /// Your champion
        #[arg(long)]
        champion: String,

        /// Loading-screen capture to read both teams from
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Enemy as NAME:ROLE, repeatable; used without a screenshot
        #[arg(long = "enemy")]
        enemies: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write region overlays and tiles of a capture for layout checks
    Overlay {
        image: PathBuf,

        #[arg(default_value = "./debug_output")]
        out_dir: PathBuf,

        #[command(flatten)]
        calibration: CalibrationArgs,
    },
}

/// Offset and stretch correction for skewed captures
#[derive(Args, Debug, Clone, Copy)]
pub struct CalibrationArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub dx: i32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub dy: i32,

    #[arg(long, default_value_t = 1.0)]
    pub sx: f64,

    #[arg(long, default_value_t = 1.0)]
    pub sy: f64,
}

impl From<CalibrationArgs> for Calibration {
    fn from(a: CalibrationArgs) -> Self {
        Calibration {
            dx: a.dx,
            dy: a.dy,
            sx: a.sx,
            sy: a.sy,
        }
    }
}

pub fn dispatch(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Train {
            dataset,
            out,
            max_iterations,
            l2,
        } => train::run(&config, dataset, out, TrainParams { max_iterations, l2 }),
        Commands::Pick {
            screenshot,
            roster,
            bench,
            replace,
            calibration,
            json,
        } => pick::run(
            config,
            pick::PickArgs {
                screenshot,
                roster,
                bench,
                replace,
                calibration: calibration.into(),
                json,
            },
        ),
        Commands::Builds {
            champion,
            screenshot,
            enemies,
            json,
        } => builds::run(config, &champion, screenshot.as_deref(), &enemies, json),
        Commands::Overlay {
            image,
            out_dir,
            calibration,
        } => overlay::run(&image, &out_dir, &calibration.into()),
    }
}

pub(crate) fn open_capture(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .to_rgb8())
}
