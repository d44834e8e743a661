use anyhow::{Context, Result};
use lol_data::ConfigError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// On-disk encoding of an artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    MessagePack,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("msgpack") | Some("mpk") => Ok(Self::MessagePack),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }
}

pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = ArtifactFormat::from_path(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let bytes = match format {
        ArtifactFormat::Json => serde_json::to_vec(value).context("Failed to encode JSON")?,
        ArtifactFormat::MessagePack => {
            rmp_serde::to_vec_named(value).context("Failed to encode MessagePack")?
        }
    };

    // write-then-rename so a crash never leaves a truncated artifact
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move artifact into {}", path.display()))?;
    debug!("Saved {} byte(s) to {}", bytes.len(), path.display());
    Ok(())
}

pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ArtifactFormat::from_path(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = match format {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        ArtifactFormat::MessagePack => rmp_serde::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(
            ArtifactFormat::from_path(Path::new("a/model.JSON")).unwrap(),
            ArtifactFormat::Json
        );
        assert_eq!(
            ArtifactFormat::from_path(Path::new("model.mpk")).unwrap(),
            ArtifactFormat::MessagePack
        );
        let err = ArtifactFormat::from_path(Path::new("model.pkl")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_both_formats_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = BTreeMap::new();
        value.insert("Lux".to_string(), vec![0.25, 1.5]);

        for name in ["nested/artifact.json", "artifact.msgpack"] {
            let path = dir.path().join(name);
            save_artifact(&value, &path).unwrap();
            let loaded: BTreeMap<String, Vec<f64>> = load_artifact(&path).unwrap();
            assert_eq!(loaded, value);
        }
    }
}
