use crate::ConfigError;
use anyhow::{bail, Context, Result};
use lol_state::ROSTER_SIZE;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Column holding the match outcome (1 = win)
pub const OUTCOME_COLUMN: &str = "win";

/// `champ{slot}_name`, slot in 1..=5
pub fn champion_column(slot: usize) -> String {
    format!("champ{}_name", slot)
}

/// `champ{slot}_tags`, comma-separated archetype tags
pub fn tags_column(slot: usize) -> String {
    format!("champ{}_tags", slot)
}

/// One historical ARAM match seen from one team
#[derive(Debug, Clone)]
pub struct MatchRecord {
    /// Champion per slot, `None` for blank cells
    pub champions: [Option<String>; ROSTER_SIZE],
    pub win: bool,
    /// Raw tag text per slot, empty when absent
    pub tags: [String; ROSTER_SIZE],
    /// Every other cell that parsed as a number, keyed by column name
    values: HashMap<String, f64>,
}

impl MatchRecord {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn champion(&self, slot: usize) -> Option<&str> {
        self.champions.get(slot).and_then(|c| c.as_deref())
    }
}

/// Historical match table used to train the model bundle
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    pub columns: Vec<String>,
    pub records: Vec<MatchRecord>,
}

impl HistoricalDataset {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::missing("historical dataset", path).into());
        }
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let data = Self::from_reader(file, path)?;
        info!(
            "Loaded {} historical match(es) with {} column(s) from {}",
            data.records.len(),
            data.columns.len(),
            path.display()
        );
        Ok(data)
    }

    /// Parse CSV from any reader. `source` only labels error messages.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .with_context(|| format!("Failed to read header of {}", source.display()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut required: Vec<String> = (1..=ROSTER_SIZE).map(champion_column).collect();
        required.push(OUTCOME_COLUMN.to_string());
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !index.contains_key(c.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingColumns {
                path: source.to_path_buf(),
                columns: missing,
            }
            .into());
        }

        let champ_idx: Vec<usize> = (1..=ROSTER_SIZE)
            .map(|s| index[champion_column(s).as_str()])
            .collect();
        let tag_idx: Vec<Option<usize>> = (1..=ROSTER_SIZE)
            .map(|s| index.get(tags_column(s).as_str()).copied())
            .collect();
        let win_idx = index[OUTCOME_COLUMN];

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.with_context(|| {
                format!("Failed to read row {} of {}", row + 2, source.display())
            })?;
            let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");

            let win = match parse_outcome(cell(win_idx)) {
                Some(w) => w,
                None => bail!(
                    "row {} of {}: '{}' is not a valid outcome",
                    row + 2,
                    source.display(),
                    cell(win_idx)
                ),
            };

            let champions: [Option<String>; ROSTER_SIZE] = std::array::from_fn(|s| {
                let name = cell(champ_idx[s]);
                (!name.is_empty()).then(|| name.to_string())
            });
            let tags: [String; ROSTER_SIZE] = std::array::from_fn(|s| {
                tag_idx[s].map(|i| cell(i).to_string()).unwrap_or_default()
            });

            let mut values = HashMap::new();
            for (i, column) in columns.iter().enumerate() {
                if champ_idx.contains(&i) || i == win_idx {
                    continue;
                }
                if let Ok(v) = cell(i).parse::<f64>() {
                    if v.is_finite() {
                        values.insert(column.clone(), v);
                    }
                }
            }

            records.push(MatchRecord {
                champions,
                win,
                tags,
                values,
            });
        }

        Ok(Self { columns, records })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Sorted, de-duplicated champion names across all slots
    pub fn champion_vocabulary(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|r| r.champions.iter().flatten().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn parse_outcome(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "win" => Some(true),
        "0" | "false" | "loss" | "lose" => Some(false),
        other => other.parse::<f64>().ok().map(|v| v >= 0.5),
    }
}
