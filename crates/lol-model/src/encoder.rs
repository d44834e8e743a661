use crate::bundle::ModelBundle;
use lol_data::MatchRecord;
use lol_state::Roster;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-champion aura columns, read from `champ{i}_name_{key}`
pub const AURA_KEYS: [&str; 8] = [
    "damage_dealt",
    "damage_taken",
    "attack_speed",
    "skill_haste",
    "hp_regen",
    "tenacity",
    "shield_absorb",
    "energy_regen",
];

/// Item-affinity flags, read from `champ{i}_is_{flag}`
pub const ROLE_FLAGS: [&str; 4] = ["ad_items", "ap_items", "tank_items", "ranged"];

const STAT_BASES: [&str; 6] = ["hp", "mp", "armor", "spellblock", "attackdamage", "attackspeed"];
const STAT_LEVELS: [&str; 5] = ["_lvl3", "_lvl6", "_lvl11", "_lvl16", "_lvl18"];

/// Every candidate per-match stat column, stat-major
pub fn stat_columns() -> Vec<String> {
    STAT_BASES
        .iter()
        .flat_map(|s| STAT_LEVELS.iter().map(move |l| format!("{}{}", s, l)))
        .collect()
}

/// Attribute-profile feature names in model order
pub fn attribute_columns() -> Vec<String> {
    AURA_KEYS
        .iter()
        .map(|k| k.to_string())
        .chain(std::iter::once("CCcount".to_string()))
        .chain(ROLE_FLAGS.iter().map(|f| format!("is_{}", f)))
        .collect()
}

/// Attribute features of the champion in `slot` (0-based), missing cells 0.0
pub fn slot_attributes(record: &MatchRecord, slot: usize) -> Vec<f64> {
    let n = slot + 1;
    let value = |col: String| record.value(&col).unwrap_or(0.0);
    AURA_KEYS
        .iter()
        .map(|k| value(format!("champ{}_name_{}", n, k)))
        .chain(std::iter::once(value(format!("champ{}_name_CCcount", n))))
        .chain(ROLE_FLAGS.iter().map(|f| value(format!("champ{}_is_{}", n, f))))
        .collect()
}

/// Multi-hot over a sorted vocabulary. Names outside it contribute nothing.
pub fn composition<'a>(
    vocabulary: &[String],
    champions: impl IntoIterator<Item = &'a str>,
) -> Vec<f64> {
    let mut row = vec![0.0; vocabulary.len()];
    for champ in champions {
        if let Ok(i) = vocabulary.binary_search_by(|v| v.as_str().cmp(champ)) {
            row[i] = 1.0;
        }
    }
    row
}

/// Slim copy of a training match kept for stat/tag aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub champions: Vec<String>,
    /// Aligned with the bundle's stat columns
    pub stats: Vec<Option<f64>>,
    /// All five tag cells joined with the tag delimiter
    pub tags: String,
}

impl HistoryRow {
    pub fn from_record(record: &MatchRecord, stat_columns: &[String]) -> Self {
        Self {
            champions: record.champions.iter().flatten().cloned().collect(),
            stats: stat_columns.iter().map(|c| record.value(c)).collect(),
            tags: record.tags.join(","),
        }
    }

    fn mentions_any(&self, champions: &HashSet<&str>) -> bool {
        self.champions.iter().any(|c| champions.contains(c.as_str()))
    }
}

/// Composition row for the synergy classifier
pub fn encode_composition(roster: &Roster, bundle: &ModelBundle) -> Vec<f64> {
    composition(&bundle.vocabulary, roster.iter())
}

/// Profile row of one champion, `None` when it never appeared in training
pub fn attribute_profile<'a>(champion: &str, bundle: &'a ModelBundle) -> Option<&'a [f64]> {
    bundle.profiles.get(champion).map(Vec::as_slice)
}

/// Unscaled stat/tag row in the bundle's stat schema.
///
/// Means are taken over every historical match that names at least one
/// roster champion. With no such match each column falls back to 0.0.
pub fn encode_stat_tags(roster: &Roster, bundle: &ModelBundle) -> Vec<f64> {
    let team: HashSet<&str> = roster.iter().collect();
    let rows: Vec<&HistoryRow> = bundle
        .history
        .iter()
        .filter(|r| r.mentions_any(&team))
        .collect();

    let mut values: HashMap<String, f64> = HashMap::new();

    for (i, column) in bundle.stat_columns.iter().enumerate() {
        let present: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.stats.get(i).copied().flatten())
            .collect();
        if !present.is_empty() {
            values.insert(column.clone(), present.iter().sum::<f64>() / present.len() as f64);
        }
    }

    if !rows.is_empty() {
        let mut sums = vec![0.0; bundle.vectorizer.vocabulary().len()];
        for row in &rows {
            for (s, c) in sums.iter_mut().zip(bundle.vectorizer.transform(&row.tags)) {
                *s += c;
            }
        }
        for (name, sum) in bundle.vectorizer.feature_names().into_iter().zip(sums) {
            values.insert(name, sum / rows.len() as f64);
        }
    }

    bundle.stat_schema.row(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_columns_shape() {
        let cols = stat_columns();
        assert_eq!(cols.len(), 30);
        assert_eq!(cols[0], "hp_lvl3");
        assert_eq!(cols[29], "attackspeed_lvl18");
    }

    #[test]
    fn test_attribute_columns() {
        let cols = attribute_columns();
        assert_eq!(cols.len(), 13);
        assert_eq!(cols[8], "CCcount");
        assert_eq!(cols[12], "is_ranged");
    }

    #[test]
    fn test_composition_is_order_independent() {
        let vocab: Vec<String> = ["Ahri", "Garen", "Lux", "Zed"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let a = composition(&vocab, ["Zed", "Ahri", "Unknown"]);
        let b = composition(&vocab, ["Ahri", "Unknown", "Zed"]);
        assert_eq!(a, b);
        assert_eq!(a, vec![1.0, 0.0, 0.0, 1.0]);
    }
}
