use anyhow::{Context, Result};
use lol_data::DataPaths;
use lol_vision::credentials::AMBIENT_TOKEN_VAR;
use lol_vision::{Credential, EndpointKey, PORTRAIT_THRESHOLD};
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_REGION: &str = "us-central1";

/// A deployed classifier plus the credential used to call it
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub project: String,
    pub region: String,
    pub endpoint_id: String,
    pub credential: Credential,
}

impl EndpointConfig {
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(&self.project, &self.region, &self.endpoint_id, &self.credential)
    }
}

/// Session settings, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data: DataPaths,
    /// Bundle candidates in preference order
    pub model_paths: Vec<PathBuf>,
    pub dataset_path: PathBuf,
    pub champion_endpoint: Option<EndpointConfig>,
    pub rune_endpoint: Option<EndpointConfig>,
    pub ocr_credential: Option<Credential>,
    /// Percent
    pub confidence_threshold: f64,
}

impl AppConfig {
    /// Read the process environment, after loading `.env` when present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data = DataPaths::new(var("DRAFT_DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let model_paths = match var("DRAFT_MODEL_PATH") {
            Some(p) => vec![PathBuf::from(p)],
            None => data.model_bundles(),
        };
        let dataset_path = var("DRAFT_DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data.dataset());

        let key_file = var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from);
        let ambient = var(AMBIENT_TOKEN_VAR).is_some();

        let champion_endpoint = endpoint(
            "champion classifier",
            var("PROJECT_ID"),
            var("REGION"),
            var("ENDPOINT_ID"),
            Credential::select(
                key_file.clone(),
                var("GOOGLE_APPLICATION_CREDENTIALS_B64"),
                ambient,
            ),
        );
        let rune_endpoint = endpoint(
            "rune classifier",
            var("RUNE_PROJECT_ID"),
            var("RUNE_LOCATION"),
            var("RUNE_ENDPOINT_ID"),
            Credential::select(key_file.clone(), var("RUNE_CRED_B64"), ambient),
        );
        let ocr_credential = Credential::select(key_file, var("VISION_CRED_B64"), ambient);
        if ocr_credential.is_none() {
            warn!("No text detection credential configured, loading-screen reading disabled");
        }

        let confidence_threshold = match var("DRAFT_CONFIDENCE_THRESHOLD") {
            Some(raw) => raw
                .parse::<f64>()
                .with_context(|| format!("DRAFT_CONFIDENCE_THRESHOLD '{}' is not a number", raw))?,
            None => PORTRAIT_THRESHOLD,
        };

        Ok(Self {
            data,
            model_paths,
            dataset_path,
            champion_endpoint,
            rune_endpoint,
            ocr_credential,
            confidence_threshold,
        })
    }
}

fn endpoint(
    service: &str,
    project: Option<String>,
    region: Option<String>,
    endpoint_id: Option<String>,
    credential: Option<Credential>,
) -> Option<EndpointConfig> {
    match (project, endpoint_id, credential) {
        (Some(project), Some(endpoint_id), Some(credential)) => Some(EndpointConfig {
            project,
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_id,
            credential,
        }),
        _ => {
            warn!("{} is not configured, detection falls back to manual selection", service);
            None
        }
    }
}
