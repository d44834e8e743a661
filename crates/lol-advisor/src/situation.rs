use lol_data::CcWeights;
use lol_state::{roles, PickTriple};
use serde::Serialize;

/// AP champions needed before the enemy counts as AP-heavy
pub const AP_MAJORITY: usize = 3;
/// Summed crowd-control weight that counts as heavy CC
pub const CC_HIGH: f64 = 3.0;
/// Tanks needed before the enemy counts as tank-heavy
pub const TANKS_HIGH: usize = 2;

pub const ENEMY_AP: &str = "enemy_ap";
pub const ENEMY_AD: &str = "enemy_ad";
pub const CC_HIGH_BAND: &str = "cc_high";
pub const CC_LOW_BAND: &str = "cc_low";
pub const TANKS_HIGH_BAND: &str = "tanks_high";
pub const TANKS_LOW_BAND: &str = "tanks_low";

/// Aggregates of the opposing roster used to pick build situations.
/// A role counts toward every category whose name it contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnemyProfile {
    pub ad: usize,
    pub ap: usize,
    pub tanks: usize,
    pub supports: usize,
    /// Unknown champions add nothing
    pub cc: f64,
}

/// The two lookup keys of one opposing roster, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SituationKeys {
    pub damage: String,
    pub tanks: String,
    pub cc_band: &'static str,
}

impl SituationKeys {
    pub fn ordered(&self) -> [&str; 2] {
        [&self.damage, &self.tanks]
    }
}

impl EnemyProfile {
    pub fn from_triples(enemies: &[PickTriple], cc: &CcWeights) -> Self {
        let mut profile = Self::default();
        for enemy in enemies {
            let role = enemy.role.as_str();
            profile.ad += roles::is_ad(role) as usize;
            profile.ap += roles::is_ap(role) as usize;
            profile.tanks += roles::is_tank(role) as usize;
            profile.supports += roles::is_support(role) as usize;
            profile.cc += cc.weight(&enemy.champion).unwrap_or(0.0);
        }
        profile
    }

    pub fn situation_keys(&self) -> SituationKeys {
        let damage = if self.ap >= AP_MAJORITY { ENEMY_AP } else { ENEMY_AD };
        let cc_band = if self.cc >= CC_HIGH { CC_HIGH_BAND } else { CC_LOW_BAND };
        let tanks = if self.tanks >= TANKS_HIGH {
            TANKS_HIGH_BAND
        } else {
            TANKS_LOW_BAND
        };
        SituationKeys {
            damage: format!("{}+{}", damage, cc_band),
            tanks: format!("{}+{}", tanks, cc_band),
            cc_band,
        }
    }
}

/// Headline counts for display. Each champion lands in at most one bucket,
/// chosen by the leading word of its role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnemySummary {
    pub ad: usize,
    pub ap: usize,
    pub tanks: usize,
    pub supports: usize,
    pub cc: f64,
}

impl EnemySummary {
    pub fn from_triples(enemies: &[PickTriple], cc: &CcWeights) -> Self {
        let mut summary = Self::default();
        for enemy in enemies {
            let role = enemy.role.as_str();
            if role.starts_with(roles::AD) {
                summary.ad += 1;
            } else if role.starts_with(roles::AP) {
                summary.ap += 1;
            } else if role.starts_with(roles::TANK) {
                summary.tanks += 1;
            } else if role.starts_with(roles::SUPPORT) {
                summary.supports += 1;
            }
            summary.cc += cc.weight(&enemy.champion).unwrap_or(0.0);
        }
        summary
    }

    /// Human-readable reasons behind the recommended builds
    pub fn explain(&self) -> Vec<String> {
        let mut reasons = vec![format!(
            "Enemy composition: AD {} / AP {} / Tank {} / Support {} / total CC {}",
            self.ad, self.ap, self.tanks, self.supports, self.cc
        )];
        reasons.push(
            match self.ap.cmp(&self.ad) {
                std::cmp::Ordering::Greater => {
                    "Enemy damage leans AP, magic resist items pay off."
                }
                std::cmp::Ordering::Less => "Enemy damage leans AD, armor items pay off.",
                std::cmp::Ordering::Equal => {
                    "Enemy damage is split between AD and AP, mix armor and magic resist."
                }
            }
            .to_string(),
        );
        if self.cc >= CC_HIGH {
            reasons.push(
                "Enemy has a lot of crowd control, tenacity and cleanse matter.".to_string(),
            );
        }
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(champion: &str, role: &str) -> PickTriple {
        PickTriple {
            champion: champion.to_string(),
            rune: None,
            role: role.to_string(),
        }
    }

    #[test]
    fn test_ap_heavy_high_cc() {
        let cc = CcWeights::from_pairs([("Lux", 2.0), ("Morgana", 2.0)]);
        let team = vec![
            enemy("Lux", "AP"),
            enemy("Morgana", "AP"),
            enemy("Brand", "AP"),
            enemy("Jinx", "AD"),
            enemy("Garen", "AD"),
        ];
        let keys = EnemyProfile::from_triples(&team, &cc).situation_keys();
        assert_eq!(keys.damage, "enemy_ap+cc_high");
        assert!(keys.damage.starts_with("enemy_ap+cc_high"));
        assert_eq!(keys.tanks, "tanks_low+cc_high");
    }

    #[test]
    fn test_ad_heavy_no_cc_depends_on_tanks() {
        let cc = CcWeights::default();
        let mut team = vec![
            enemy("A", "AD"),
            enemy("B", "AD"),
            enemy("C", "AD"),
            enemy("D", "AD"),
            enemy("E", "AP"),
        ];
        let keys = EnemyProfile::from_triples(&team, &cc).situation_keys();
        assert_eq!(keys.ordered(), ["enemy_ad+cc_low", "tanks_low+cc_low"]);

        team[0].role = "AD Tank".into();
        team[1].role = "Tank".into();
        let keys = EnemyProfile::from_triples(&team, &cc).situation_keys();
        assert_eq!(keys.damage, "enemy_ad+cc_low");
        assert_eq!(keys.tanks, "tanks_high+cc_low");
    }

    #[test]
    fn test_keys_are_deterministic() {
        let cc = CcWeights::from_pairs([("A", 1.0)]);
        let team = vec![enemy("A", "Support"), enemy("B", "unknown")];
        let a = EnemyProfile::from_triples(&team, &cc);
        let b = EnemyProfile::from_triples(&team, &cc);
        assert_eq!(a, b);
        assert_eq!(a.situation_keys(), b.situation_keys());
        assert_eq!(a.supports, 1);
    }

    #[test]
    fn test_summary_first_match_wins() {
        let team = vec![enemy("A", "AD Tank"), enemy("B", "Tank"), enemy("C", "AP")];
        let summary = EnemySummary::from_triples(&team, &CcWeights::default());
        assert_eq!((summary.ad, summary.ap, summary.tanks), (1, 1, 1));
        let reasons = summary.explain();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[1].contains("split"));
    }

    #[test]
    fn test_summary_warns_on_cc() {
        let cc = CcWeights::from_pairs([("A", 3.0)]);
        let summary = EnemySummary::from_triples(&[enemy("A", "AP")], &cc);
        let reasons = summary.explain();
        assert!(reasons[1].contains("AP"));
        assert!(reasons.last().unwrap().contains("crowd control"));
    }
}
