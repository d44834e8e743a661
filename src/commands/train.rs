use anyhow::Result;
use lol_data::HistoricalDataset;
use lol_model::{ModelBundle, TrainParams};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;

pub fn run(
    config: &AppConfig,
    dataset: Option<PathBuf>,
    out: Option<PathBuf>,
    params: TrainParams,
) -> Result<()> {
    let dataset = dataset.unwrap_or_else(|| config.dataset_path.clone());
    let out = out
        .or_else(|| config.model_paths.first().cloned())
        .unwrap_or_else(|| config.data.root.join("model_bundle.json"));

    let data = HistoricalDataset::load(&dataset)?;
    info!("Training on {} match(es) with {:?}", data.records.len(), params);
    let bundle = ModelBundle::train(&data, &params)?;
    bundle.save(&out)?;

    println!("Trained on {} match(es)", data.records.len());
    println!("   Champions: {}", bundle.vocabulary.len());
    println!("   Profiles:  {}", bundle.profiles.len());
    println!("   Stat/tag:  {} column(s)", bundle.stat_schema.len());
    println!("   Output:    {}", out.display());
    Ok(())
}
