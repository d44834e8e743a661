use anyhow::{bail, Result};
use lol_model::WinRateModel;
use lol_state::{Roster, ROSTER_SIZE};
use serde::Serialize;
use tracing::debug;

/// Best single replacement for one roster slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRecommendation {
    pub slot: usize,
    pub replaced: String,
    pub candidate: String,
    pub baseline: f64,
    pub probability: f64,
    pub improvement: f64,
}

/// Try every candidate in `slot` and keep the one with the largest strictly
/// positive gain. Equal gains keep the earlier candidate. `None` means no
/// candidate beats the current roster.
///
/// Candidates already playing in another slot are skipped, since swapping
/// them in would field the same champion twice.
pub fn recommend_swap<M: WinRateModel + ?Sized>(
    model: &M,
    roster: &Roster,
    slot: usize,
    candidates: &[String],
) -> Result<Option<SwapRecommendation>> {
    if slot >= ROSTER_SIZE {
        bail!("slot {} is out of range (0..{})", slot, ROSTER_SIZE);
    }
    let replaced = &roster.champions()[slot];
    let baseline = model.win_probability(roster);

    let mut best: Option<SwapRecommendation> = None;
    for candidate in candidates {
        if candidate != replaced && roster.contains(candidate) {
            continue;
        }
        let probability = model.win_probability(&roster.with_swap(slot, candidate));
        let improvement = probability - baseline;
        debug!("swap {} -> {}: {:+.4}", replaced, candidate, improvement);

        let current_best = best.as_ref().map(|b| b.improvement).unwrap_or(0.0);
        if improvement > current_best {
            best = Some(SwapRecommendation {
                slot,
                replaced: replaced.clone(),
                candidate: candidate.clone(),
                baseline,
                probability,
                improvement,
            });
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Sums a fixed value per champion
    struct Table(HashMap<&'static str, f64>);

    impl WinRateModel for Table {
        fn win_probability(&self, roster: &Roster) -> f64 {
            roster.iter().map(|c| self.0.get(c).copied().unwrap_or(0.0)).sum()
        }
    }

    fn model() -> Table {
        Table(HashMap::from([
            ("A", 0.1),
            ("B", 0.1),
            ("C", 0.1),
            ("D", 0.1),
            ("E", 0.1),
            ("X", 0.15),
            ("Y", 0.15),
            ("Z", 0.05),
        ]))
    }

    fn roster() -> Roster {
        Roster::new(["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_picks_first_best() {
        let rec = recommend_swap(&model(), &roster(), 0, &names(&["Z", "X", "Y"]))
            .unwrap()
            .unwrap();
        assert_eq!(rec.candidate, "X");
        assert_eq!(rec.replaced, "A");
        assert!((rec.improvement - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_no_positive_improvement_is_none() {
        let rec = recommend_swap(&model(), &roster(), 0, &names(&["Z", "A"])).unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_noop_candidate_has_zero_gain() {
        let m = model();
        let r = roster();
        let base = m.win_probability(&r);
        assert_eq!(m.win_probability(&r.with_swap(2, "C")) - base, 0.0);
        assert!(recommend_swap(&m, &r, 2, &names(&["C"])).unwrap().is_none());
    }

    #[test]
    fn test_skips_champions_in_other_slots() {
        let mut m = model();
        m.0.insert("B", 0.9);
        let rec = recommend_swap(&m, &roster(), 0, &names(&["B"])).unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_slot_out_of_range() {
        assert!(recommend_swap(&model(), &roster(), 5, &[]).is_err());
    }
}
