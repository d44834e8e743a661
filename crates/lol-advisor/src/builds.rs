use crate::situation::{EnemyProfile, SituationKeys};
use anyhow::Result;
use lol_data::{BuildTable, CcWeights, ConfigError, DataPaths};
use lol_model::{load_artifact, FeatureSchema, LogisticModel};
use lol_state::{roles, PickTriple};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Secondary classifier scoring (champion, role, enemy roles, items) rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildScorer {
    pub schema: FeatureSchema,
    pub model: LogisticModel,
}

impl BuildScorer {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::missing("build scorer", path).into());
        }
        let scorer: Self = load_artifact(path)?;
        info!(
            "Loaded build scorer with {} feature(s) from {}",
            scorer.schema.len(),
            path.display()
        );
        Ok(scorer)
    }

    /// Feature row for one candidate build. Columns the schema lacks are
    /// dropped, columns the build does not touch stay 0.0.
    pub fn features(
        &self,
        champion: &str,
        role: &str,
        enemies: &[PickTriple],
        items: &[String],
    ) -> Vec<f64> {
        let mut values: HashMap<String, f64> = HashMap::new();
        values.insert(format!("championName_{}", champion), 1.0);
        values.insert(format!("team_role_{}", role), 1.0);
        for enemy in enemies {
            *values.entry(format!("enemy_role_{}", enemy.role)).or_insert(0.0) += 1.0;
        }
        for item in items {
            values.insert(format!("item_{}", item), 1.0);
        }
        self.schema.row(&values)
    }

    pub fn score(
        &self,
        champion: &str,
        role: &str,
        enemies: &[PickTriple],
        items: &[String],
    ) -> f64 {
        self.model
            .predict_proba(&self.features(champion, role, enemies, items))
    }
}

/// One role's build for the current enemy composition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildRecommendation {
    pub role: String,
    /// Table key the build was found under
    pub situation: String,
    pub items: Vec<String>,
    pub score: f64,
}

/// Stateless between calls; every input table is read-only
pub struct BuildEngine {
    table: BuildTable,
    cc: CcWeights,
    scorer: BuildScorer,
}

impl BuildEngine {
    pub fn new(table: BuildTable, cc: CcWeights, scorer: BuildScorer) -> Self {
        Self { table, cc, scorer }
    }

    /// All three artifacts are required; any missing one is a config error
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let table = BuildTable::load(&paths.build_table())?;
        let cc = CcWeights::load(&paths.cc_weights())?;
        let scorer = BuildScorer::load(&paths.build_scorer())?;
        Ok(Self::new(table, cc, scorer))
    }

    pub fn cc_weights(&self) -> &CcWeights {
        &self.cc
    }

    /// Builds for every role the table knows for `champion`, best score
    /// first. Empty means no applicable build.
    pub fn recommend(&self, champion: &str, enemies: &[PickTriple]) -> Vec<BuildRecommendation> {
        let keys = EnemyProfile::from_triples(enemies, &self.cc).situation_keys();
        debug!("Situation keys for {}: {:?}", champion, keys.ordered());

        let mut out: Vec<BuildRecommendation> = self
            .table
            .roles_for(champion)
            .into_iter()
            .filter_map(|role| {
                let (situation, items) = self.find_build(champion, role, &keys)?;
                let score = self.scorer.score(champion, role, enemies, items);
                Some(BuildRecommendation {
                    role: role.to_string(),
                    situation,
                    items: items.to_vec(),
                    score,
                })
            })
            .collect();
        out.sort_by(|a, b| b.score.total_cmp(&a.score));
        info!("{} build(s) for {}", out.len(), champion);
        out
    }

    /// Exact key match in priority order, then for supports any key sharing
    /// the CC band
    fn find_build<'a>(
        &'a self,
        champion: &str,
        role: &str,
        keys: &SituationKeys,
    ) -> Option<(String, &'a [String])> {
        for key in keys.ordered() {
            if let Some(items) = self.table.lookup(champion, role, key) {
                return Some((key.to_string(), items));
            }
        }
        if role != roles::SUPPORT {
            return None;
        }
        let (key, items) = self
            .table
            .situations(champion, role)
            .find(|(k, items)| k.contains(keys.cc_band) && !items.is_empty())?;
        debug!("{} support build found by CC band {}", champion, keys.cc_band);
        Some((key.to_string(), items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn enemy(champion: &str, role: &str) -> PickTriple {
        PickTriple {
            champion: champion.into(),
            rune: None,
            role: role.into(),
        }
    }

    fn engine() -> BuildEngine {
        let mut table = BuildTable::default();
        table.insert("Lux", "AP", "enemy_ad+cc_low", items(&["Luden", "Zhonya"]));
        table.insert("Lux", "AP", "enemy_ap+cc_high", items(&["Luden", "Banshee"]));
        table.insert("Lux", "Support", "tanks_high+cc_low", items(&["Moonstone"]));
        table.insert("Lux", "Support", "enemy_ap+cc_high", items(&["Redemption"]));
        table.insert("Garen", "Tank", "tanks_high+cc_high", items(&["Sunfire"]));

        let schema = FeatureSchema::new(items(&[
            "championName_Lux",
            "team_role_AP",
            "team_role_Support",
            "enemy_role_AD",
            "item_Luden",
            "item_Zhonya",
            "item_Moonstone",
        ]));
        let model = LogisticModel {
            weights: vec![0.0, 0.5, -0.5, 0.1, 0.2, 0.2, 0.1],
            bias: 0.0,
        };
        BuildEngine::new(table, CcWeights::default(), BuildScorer { schema, model })
    }

    fn ad_team() -> Vec<PickTriple> {
        (0..5).map(|i| enemy(&format!("E{}", i), "AD")).collect()
    }

    #[test]
    fn test_exact_and_support_fallback_sorted() {
        let recs = engine().recommend("Lux", &ad_team());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].role, "AP");
        assert_eq!(recs[0].items, items(&["Luden", "Zhonya"]));
        assert_eq!(recs[0].situation, "enemy_ad+cc_low");
        assert_eq!(recs[1].role, "Support");
        assert_eq!(recs[1].situation, "tanks_high+cc_low");
        assert!(recs[0].score >= recs[1].score);
    }

    #[test]
    fn test_non_support_without_match_is_skipped() {
        let recs = engine().recommend("Garen", &ad_team());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_unknown_champion_is_empty() {
        assert!(engine().recommend("Nobody", &ad_team()).is_empty());
    }

    #[test]
    fn test_feature_row_counts_enemy_roles() {
        let engine = engine();
        let row = engine
            .scorer
            .features("Lux", "AP", &ad_team(), &items(&["Luden", "Unknown"]));
        assert_eq!(row, vec![1.0, 1.0, 0.0, 5.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_scorer_is_config_error() {
        let err = BuildScorer::load(Path::new("/nonexistent/scorer.json")).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
