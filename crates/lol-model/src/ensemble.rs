use crate::bundle::ModelBundle;
use crate::encoder::{attribute_profile, encode_composition, encode_stat_tags};
use lol_state::Roster;
use serde::Serialize;
use tracing::debug;

pub const SYNERGY_WEIGHT: f64 = 0.60;
pub const ATTRIBUTE_WEIGHT: f64 = 0.15;
pub const STAT_TAG_WEIGHT: f64 = 0.25;

/// Probability used for a champion without an attribute profile
pub const NEUTRAL_PRIOR: f64 = 0.5;

/// Anything that can score a roster. Lets the swap search run against
/// a stub in tests.
pub trait WinRateModel {
    fn win_probability(&self, roster: &Roster) -> f64;
}

/// Sub-model outputs behind one ensemble score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinBreakdown {
    pub synergy: f64,
    pub attribute: f64,
    pub stat_tag: f64,
    pub combined: f64,
}

/// Roster must already satisfy the five-distinct invariant.
pub fn evaluate(roster: &Roster, bundle: &ModelBundle) -> f64 {
    evaluate_breakdown(roster, bundle).combined
}

pub fn evaluate_breakdown(roster: &Roster, bundle: &ModelBundle) -> WinBreakdown {
    let synergy = bundle.synergy.predict_proba(&encode_composition(roster, bundle));

    let per_champion: Vec<f64> = roster
        .iter()
        .map(|champ| match attribute_profile(champ, bundle) {
            Some(profile) => bundle
                .attribute
                .predict_proba(&bundle.attribute_scaler.transform(profile)),
            None => NEUTRAL_PRIOR,
        })
        .collect();
    let attribute = if per_champion.is_empty() {
        NEUTRAL_PRIOR
    } else {
        per_champion.iter().sum::<f64>() / per_champion.len() as f64
    };

    let stat_row = bundle.scaler.transform(&encode_stat_tags(roster, bundle));
    let stat_tag = bundle.stat.predict_proba(&stat_row);

    let combined =
        SYNERGY_WEIGHT * synergy + ATTRIBUTE_WEIGHT * attribute + STAT_TAG_WEIGHT * stat_tag;
    debug!(
        "synergy={:.3} attribute={:.3} stat_tag={:.3} -> {:.3}",
        synergy, attribute, stat_tag, combined
    );
    WinBreakdown {
        synergy,
        attribute,
        stat_tag,
        combined: combined.clamp(0.0, 1.0),
    }
}

impl WinRateModel for ModelBundle {
    fn win_probability(&self, roster: &Roster) -> f64 {
        evaluate(roster, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TrainParams;
    use lol_data::HistoricalDataset;
    use std::path::Path;

    const CSV: &str = "\
champ1_name,champ2_name,champ3_name,champ4_name,champ5_name,win,champ1_tags,hp_lvl3
Ahri,Ashe,Garen,Lux,Zed,1,Mage,600
Ahri,Braum,Garen,Sona,Zed,1,Mage,640
Darius,Braum,Nami,Sona,Jinx,0,Fighter,700
Darius,Ashe,Nami,Lux,Jinx,0,Fighter,720
";

    fn bundle() -> ModelBundle {
        let data = HistoricalDataset::from_reader(CSV.as_bytes(), Path::new("t.csv")).unwrap();
        ModelBundle::train(&data, &TrainParams::default()).unwrap()
    }

    fn roster(names: &[&str]) -> Roster {
        Roster::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let bundle = bundle();
        for names in [
            ["Ahri", "Ashe", "Garen", "Lux", "Zed"],
            ["Darius", "Braum", "Nami", "Sona", "Jinx"],
            ["V1", "V2", "V3", "V4", "V5"],
        ] {
            let p = evaluate(&roster(&names), &bundle);
            assert!((0.0..=1.0).contains(&p), "{} out of range", p);
        }
    }

    #[test]
    fn test_order_independent() {
        let bundle = bundle();
        let a = evaluate(&roster(&["Ahri", "Ashe", "Garen", "Lux", "Zed"]), &bundle);
        let b = evaluate(&roster(&["Zed", "Lux", "Ahri", "Garen", "Ashe"]), &bundle);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_weights_combine() {
        let bundle = bundle();
        let w = evaluate_breakdown(&roster(&["Ahri", "Ashe", "Garen", "Lux", "Zed"]), &bundle);
        let expected = 0.60 * w.synergy + 0.15 * w.attribute + 0.25 * w.stat_tag;
        assert!((w.combined - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_champions_get_neutral_attribute() {
        let bundle = bundle();
        let w = evaluate_breakdown(&roster(&["V1", "V2", "V3", "V4", "V5"]), &bundle);
        assert_eq!(w.attribute, NEUTRAL_PRIOR);
    }

    #[test]
    fn test_winning_composition_scores_higher() {
        let bundle = bundle();
        let winners = evaluate(&roster(&["Ahri", "Ashe", "Garen", "Lux", "Zed"]), &bundle);
        let losers = evaluate(&roster(&["Darius", "Braum", "Nami", "Sona", "Jinx"]), &bundle);
        assert!(winners > losers);
    }
}
