use anyhow::anyhow;
use draft_advisor_lib::{parse_enemy, AppConfig, AppContext, VisionServices};
use image::RgbImage;
use lol_advisor::BuildEngine;
use lol_capture::Calibration;
use lol_data::{AliasTable, DataPaths, RuneRoles};
use lol_model::encoder::attribute_profile;
use lol_model::ModelBundle;
use lol_state::{PickTriple, Roster};
use std::collections::HashMap;
use std::path::PathBuf;

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn sample_config() -> AppConfig {
    let env: HashMap<&str, String> = HashMap::from([(
        "DRAFT_DATA_DIR",
        sample_dir().to_string_lossy().into_owned(),
    )]);
    AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap()
}

fn roster(names: &[&str]) -> Roster {
    Roster::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
}

fn enemies(raw: &[&str]) -> Vec<PickTriple> {
    raw.iter().map(|e| parse_enemy(e).unwrap()).collect()
}

const WINNERS: [&str; 5] = ["Ahri", "Leona", "Malphite", "Sona", "Ashe"];
const LOSERS: [&str; 5] = ["Darius", "Zed", "Nami", "Jinx", "Braum"];

#[test]
fn test_session_trains_from_sample_dataset() {
    let ctx = AppContext::load(sample_config());
    assert!(ctx.bundle().is_ok());
    assert!(!ctx.detection_available());
    assert!(ctx.resolver().in_vocabulary("Ahri"));

    let good = ctx.evaluate(&roster(&WINNERS)).unwrap();
    let bad = ctx.evaluate(&roster(&LOSERS)).unwrap();
    for p in [good.combined, bad.combined] {
        assert!(p > 0.0 && p < 1.0);
    }
    assert!(good.synergy > 0.5);
    assert!(good.combined > bad.combined);
}

#[test]
fn test_swap_prefers_winning_champion() {
    let ctx = AppContext::load(sample_config());
    let team = roster(&LOSERS);
    let bench: Vec<String> = ["Teemo", "Darius", "Ahri"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rec = ctx.recommend_swap(&team, 1, &bench).unwrap().unwrap();
    assert_eq!(rec.replaced, "Zed");
    assert_eq!(rec.candidate, "Ahri");
    assert!(rec.improvement > 0.0);
    assert!((rec.probability - rec.baseline - rec.improvement).abs() < 1e-12);

    assert!(ctx.recommend_swap(&team, 5, &bench).is_err());
}

#[test]
fn test_champion_present_only_in_wins() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("matches.csv");
    std::fs::write(
        &csv,
        "champ1_name,champ2_name,champ3_name,champ4_name,champ5_name,win\n\
         A,B,C,D,E,1\n\
         A,F,G,H,I,1\n\
         F,G,H,I,J,0\n\
         B,F,G,H,J,0\n",
    )
    .unwrap();
    let out = dir.path().join("bundle.msgpack");

    let bundle = ModelBundle::load_or_train(&[out.clone()], &csv).unwrap();
    let team = roster(&["A", "B", "C", "D", "E"]);
    assert!(lol_model::evaluate_breakdown(&team, &bundle).synergy >= 0.5);

    let swapped = team.with_swap(0, "Z");
    assert!(attribute_profile("Z", &bundle).is_none());
    let p = lol_model::evaluate(&swapped, &bundle);
    assert!((0.0..=1.0).contains(&p));

    bundle.save(&out).unwrap();
    let reloaded = ModelBundle::load_or_train(&[out], &csv).unwrap();
    assert_eq!(lol_model::evaluate(&team, &reloaded), lol_model::evaluate(&team, &bundle));
}

#[test]
fn test_unseen_champion_scores_without_error() {
    let ctx = AppContext::load(sample_config());
    let breakdown = ctx
        .evaluate(&roster(&["Teemo", "Yuumi", "Gwen", "Kayn", "Viego"]))
        .unwrap();
    assert_eq!(breakdown.attribute, 0.5);
    assert!(breakdown.combined > 0.0 && breakdown.combined < 1.0);
}

#[test]
fn test_builds_against_ad_heavy_high_cc() {
    let ctx = AppContext::load(sample_config());
    let foes = enemies(&["Darius:AD", "Zed:AD", "Jinx:AD", "Braum:Support", "Leona:Tank"]);

    let nami = ctx.recommend_builds("Nami", &foes).unwrap();
    assert_eq!(nami.len(), 1);
    assert_eq!(nami[0].situation, "enemy_ad+cc_high");
    assert_eq!(nami[0].items[1], "Redemption");

    // AD role has neither key, Tank matches on damage
    let garen = ctx.recommend_builds("Garen", &foes).unwrap();
    assert_eq!(garen.len(), 1);
    assert_eq!(garen[0].role, "Tank");

    assert!(ctx.recommend_builds("Teemo", &foes).unwrap().is_empty());
}

#[test]
fn test_support_falls_back_to_cc_band() {
    let ctx = AppContext::load(sample_config());
    let foes = enemies(&["Ahri:AP", "Lux:AP", "Sona:AP Support", "Leona:Tank", "Braum:Support"]);

    let nami = ctx.recommend_builds("Nami", &foes).unwrap();
    assert_eq!(nami.len(), 1);
    assert_eq!(nami[0].situation, "enemy_ad+cc_high");

    let summary = ctx.summarize_enemies(&foes);
    assert_eq!((summary.ap, summary.tanks, summary.supports), (3, 1, 1));
    let reasons = summary.explain();
    assert!(reasons[1].contains("AP"));
    assert_eq!(reasons.len(), 3);
}

#[test]
fn test_missing_model_keeps_builds_available() {
    let config = sample_config();
    let paths = DataPaths::new(sample_dir());
    let ctx = AppContext::from_parts(
        config,
        Err(anyhow!("no bundle")),
        BuildEngine::load(&paths),
        RuneRoles::load(&paths.rune_roles()),
        AliasTable::default(),
        VisionServices::default(),
    );

    let err = ctx.evaluate(&roster(&WINNERS)).unwrap_err();
    assert!(err.to_string().contains("unavailable"));
    assert!(!ctx.resolver().in_vocabulary("Ahri"));

    let foes = enemies(&["Darius:AD", "Zed:AD", "Jinx:AD", "Braum:Support", "Leona:Tank"]);
    assert!(!ctx.recommend_builds("Nami", &foes).unwrap().is_empty());

    let draft = ctx
        .detect_draft(&RgbImage::new(1920, 1080), &Calibration::default())
        .unwrap();
    assert!(!draft.detection_available);
    assert!(draft.detected_roster().is_none());

    // loading screen needs the text detector
    assert!(ctx
        .read_loading_screen(&RgbImage::new(1920, 1080), "Nami")
        .is_err());
}
