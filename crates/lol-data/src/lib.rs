mod dataset;
mod error;
mod tables;

pub use dataset::{champion_column, tags_column, HistoricalDataset, MatchRecord, OUTCOME_COLUMN};
pub use error::ConfigError;
pub use tables::{AliasTable, BuildTable, CcWeights, RuneRoles};

use std::path::{Path, PathBuf};

/// Standard artifact locations inside a data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dataset(&self) -> PathBuf {
        self.root.join("renamed_data.csv")
    }

    /// Bundle candidates in preference order
    pub fn model_bundles(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("model_bundle.json"),
            self.root.join("model_bundle.msgpack"),
        ]
    }

    pub fn build_table(&self) -> PathBuf {
        self.root.join("build_table.json")
    }

    pub fn build_scorer(&self) -> PathBuf {
        self.root.join("build_scorer.json")
    }

    pub fn cc_weights(&self) -> PathBuf {
        self.root.join("champ_job_cc.csv")
    }

    pub fn rune_roles(&self) -> PathBuf {
        self.root.join("champion_rune_roles.csv")
    }

    pub fn aliases(&self) -> PathBuf {
        self.root.join("aliases.json")
    }

    /// First existing path among the candidates
    pub fn first_existing(candidates: &[PathBuf]) -> Option<&Path> {
        candidates.iter().map(PathBuf::as_path).find(|p| p.exists())
    }
}
