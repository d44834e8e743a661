use crate::classifier::{to_matrix, LogisticModel, TrainParams};
use crate::encoder::{attribute_columns, composition, slot_attributes, stat_columns, HistoryRow};
use crate::persist::{load_artifact, save_artifact};
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;
use crate::vectorizer::TagVectorizer;
use anyhow::{Context, Result};
use lol_data::{ConfigError, DataPaths, HistoricalDataset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything the ensemble needs at inference time. Built once, then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Sorted champion vocabulary; composition rows follow this order
    pub vocabulary: Vec<String>,
    pub synergy: LogisticModel,

    pub attribute_schema: FeatureSchema,
    pub attribute_scaler: StandardScaler,
    pub attribute: LogisticModel,
    /// Median attribute row per champion, unscaled
    pub profiles: BTreeMap<String, Vec<f64>>,

    /// Stat columns present in the training data, followed by tag columns
    pub stat_schema: FeatureSchema,
    pub stat_columns: Vec<String>,
    pub vectorizer: TagVectorizer,
    pub scaler: StandardScaler,
    pub stat: LogisticModel,

    pub history: Vec<HistoryRow>,
}

impl ModelBundle {
    pub fn train(data: &HistoricalDataset, params: &TrainParams) -> Result<Self> {
        if data.records.is_empty() {
            anyhow::bail!("cannot train on an empty dataset");
        }
        let labels: Vec<bool> = data.records.iter().map(|r| r.win).collect();

        // synergy
        let vocabulary = data.champion_vocabulary();
        let synergy_rows: Vec<Vec<f64>> = data
            .records
            .iter()
            .map(|r| composition(&vocabulary, r.champions.iter().flatten().map(String::as_str)))
            .collect();
        let synergy_x = to_matrix(&synergy_rows)?;
        let synergy =
            LogisticModel::fit(&synergy_x, &labels, params).context("synergy model")?;
        info!(
            "Synergy model: {} champion(s), log-loss {:.4}",
            vocabulary.len(),
            synergy.log_loss(&synergy_x, &labels)
        );

        // attribute profile, one row per (match, slot)
        let mut long_rows = Vec::new();
        let mut long_labels = Vec::new();
        let mut per_champion: HashMap<&str, Vec<Vec<f64>>> = HashMap::new();
        for record in &data.records {
            for slot in 0..record.champions.len() {
                let Some(champ) = record.champion(slot) else {
                    continue;
                };
                let row = slot_attributes(record, slot);
                per_champion.entry(champ).or_default().push(row.clone());
                long_rows.push(row);
                long_labels.push(record.win);
            }
        }
        let attribute_schema = FeatureSchema::new(attribute_columns());
        let long_x = to_matrix(&long_rows)?;
        let attribute_scaler = StandardScaler::fit(&long_x)?;
        let scaled_long = attribute_scaler.transform_matrix(long_x);
        let attribute = LogisticModel::fit(&scaled_long, &long_labels, params)
            .context("attribute model")?;
        info!(
            "Attribute model: {} champion-match row(s), log-loss {:.4}",
            long_rows.len(),
            attribute.log_loss(&scaled_long, &long_labels)
        );
        let profiles: BTreeMap<String, Vec<f64>> = per_champion
            .into_iter()
            .map(|(champ, rows)| (champ.to_string(), column_medians(&rows)))
            .collect();

        // stat/tag
        let stat_columns: Vec<String> = stat_columns()
            .into_iter()
            .filter(|c| data.has_column(c))
            .collect();
        let history: Vec<HistoryRow> = data
            .records
            .iter()
            .map(|r| HistoryRow::from_record(r, &stat_columns))
            .collect();
        let vectorizer = TagVectorizer::fit(history.iter().map(|h| h.tags.as_str()));
        let stat_schema = FeatureSchema::new(
            stat_columns
                .iter()
                .cloned()
                .chain(vectorizer.feature_names())
                .collect(),
        );
        let stat_rows: Vec<Vec<f64>> = history
            .iter()
            .map(|h| {
                h.stats
                    .iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .chain(vectorizer.transform(&h.tags))
                    .collect()
            })
            .collect();
        let stat_x = to_matrix(&stat_rows)?;
        let scaler = StandardScaler::fit(&stat_x)?;
        let scaled_stats = scaler.transform_matrix(stat_x);
        let stat = LogisticModel::fit(&scaled_stats, &labels, params).context("stat/tag model")?;
        info!(
            "Stat/tag model: {} stat column(s), {} tag(s), log-loss {:.4}",
            stat_columns.len(),
            vectorizer.vocabulary().len(),
            stat.log_loss(&scaled_stats, &labels)
        );

        Ok(Self {
            vocabulary,
            synergy,
            attribute_schema,
            attribute_scaler,
            attribute,
            profiles,
            stat_schema,
            stat_columns,
            vectorizer,
            scaler,
            stat,
            history,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_artifact(self, path)?;
        info!("Saved model bundle to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bundle: Self = load_artifact(path)?;
        info!(
            "Loaded model bundle from {} ({} champion(s))",
            path.display(),
            bundle.vocabulary.len()
        );
        Ok(bundle)
    }

    /// Load the first bundle that exists, else train from the dataset.
    /// Neither present is a configuration error naming every path tried.
    pub fn load_or_train(bundle_paths: &[PathBuf], dataset_path: &Path) -> Result<Self> {
        if let Some(path) = DataPaths::first_existing(bundle_paths) {
            return Self::load(path);
        }
        if !dataset_path.exists() {
            let mut paths = bundle_paths.to_vec();
            paths.push(dataset_path.to_path_buf());
            return Err(ConfigError::MissingArtifact {
                artifact: "model bundle or historical dataset",
                paths,
            }
            .into());
        }
        info!(
            "No model bundle found, training from {}",
            dataset_path.display()
        );
        let data = HistoricalDataset::load(dataset_path)?;
        Self::train(&data, &TrainParams::default())
            .with_context(|| format!("Failed to train from {}", dataset_path.display()))
    }
}

fn column_medians(rows: &[Vec<f64>]) -> Vec<f64> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    (0..width)
        .map(|col| {
            let mut values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        })
        .collect()
}
