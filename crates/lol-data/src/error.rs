use std::path::PathBuf;
use thiserror::Error;

/// Setup problems the operator has to fix, as opposed to data or transport
/// failures. Features that depend on the missing piece are disabled; the rest
/// of the session keeps working.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{artifact} not found (tried {})", display_paths(.paths))]
    MissingArtifact {
        artifact: &'static str,
        paths: Vec<PathBuf>,
    },

    #[error("no credential or endpoint configured for {service}")]
    MissingCredential { service: &'static str },

    #[error("credential for {service} is unusable: {reason}")]
    MalformedCredential {
        service: &'static str,
        reason: String,
    },

    #[error("{} is missing required column(s): {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error(
        "unsupported artifact format for {} (expected .json, .msgpack or .mpk)",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf },
}

impl ConfigError {
    pub fn missing(artifact: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact {
            artifact,
            paths: vec![path.into()],
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
