use anyhow::{bail, Result};
use lol_capture::Calibration;
use lol_state::{DraftState, Roster, ROSTER_SIZE};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use super::open_capture;
use crate::config::AppConfig;
use crate::pipeline::AppContext;
use lol_advisor::SwapRecommendation;
use lol_model::WinBreakdown;

pub struct PickArgs {
    pub screenshot: Option<PathBuf>,
    pub roster: Vec<String>,
    pub bench: Vec<String>,
    pub replace: Option<String>,
    pub calibration: Calibration,
    pub json: bool,
}

#[derive(Serialize)]
struct PickReport<'a> {
    draft: &'a DraftState,
    roster: &'a Roster,
    win: WinBreakdown,
    swap: Option<SwapRecommendation>,
}

pub fn run(config: AppConfig, args: PickArgs) -> Result<()> {
    let ctx = AppContext::load(config);

    let draft = match &args.screenshot {
        Some(path) => ctx.detect_draft(&open_capture(path)?, &args.calibration)?,
        None => DraftState::new(),
    };

    let roster = if !args.roster.is_empty() {
        for name in &args.roster {
            if !ctx.resolver().in_vocabulary(name) {
                warn!("'{}' never appears in the historical data", name);
            }
        }
        Roster::new(args.roster.clone())?
    } else if let Some(roster) = draft.detected_roster() {
        roster
    } else {
        bail!(
            "detected {} of {} champions; pass --roster to choose them manually",
            draft.current.len(),
            ROSTER_SIZE
        );
    };
    let bench = if args.bench.is_empty() {
        draft.bench.clone()
    } else {
        args.bench.clone()
    };

    let win = ctx.evaluate(&roster)?;
    let swap = match &args.replace {
        Some(out) => {
            let Some(slot) = roster.position(out) else {
                bail!("'{}' is not in the roster", out);
            };
            ctx.recommend_swap(&roster, slot, &bench)?
        }
        None => None,
    };

    if args.json {
        let report = PickReport {
            draft: &draft,
            roster: &roster,
            win,
            swap,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.screenshot.is_some() && !draft.detection_available {
        println!("Detection unavailable: no classifier configured");
    }
    println!("Roster: {}", roster.champions().join(", "));
    if !bench.is_empty() {
        println!("Bench:  {}", bench.join(", "));
    }
    println!(
        "Win probability: {:.1}% (synergy {:.1}%, profile {:.1}%, stat/tag {:.1}%)",
        win.combined * 100.0,
        win.synergy * 100.0,
        win.attribute * 100.0,
        win.stat_tag * 100.0
    );
    match (&args.replace, swap) {
        (Some(_), Some(rec)) => println!(
            "Swap {} -> {}: {:.1}% ({:+.1} pts)",
            rec.replaced,
            rec.candidate,
            rec.probability * 100.0,
            rec.improvement * 100.0
        ),
        (Some(out), None) => println!("No bench champion improves on {}", out),
        (None, _) => {}
    }
    Ok(())
}
