use crate::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// champion -> role -> situation key -> ordered item list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTable {
    entries: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>,
}

impl BuildTable {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::missing("build table", path).into());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let table: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(
            "Loaded build table for {} champion(s) from {}",
            table.entries.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn insert(&mut self, champion: &str, role: &str, key: &str, items: Vec<String>) {
        self.entries
            .entry(champion.to_string())
            .or_default()
            .entry(role.to_string())
            .or_default()
            .insert(key.to_string(), items);
    }

    /// Roles the table knows for a champion, in table order
    pub fn roles_for(&self, champion: &str) -> Vec<&str> {
        self.entries
            .get(champion)
            .map(|roles| roles.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn lookup(&self, champion: &str, role: &str, key: &str) -> Option<&[String]> {
        self.entries
            .get(champion)?
            .get(role)?
            .get(key)
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
    }

    /// All (situation key, build) pairs of one champion/role, in key order
    pub fn situations(
        &self,
        champion: &str,
        role: &str,
    ) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .get(champion)
            .and_then(|roles| roles.get(role))
            .into_iter()
            .flat_map(|keys| keys.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }
}

#[derive(Debug, Deserialize)]
struct CcRow {
    name: String,
    #[serde(rename = "CCcount")]
    cc_count: Option<f64>,
}

/// Crowd-control weight per champion
#[derive(Debug, Clone, Default)]
pub struct CcWeights {
    weights: HashMap<String, f64>,
}

impl CcWeights {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::missing("crowd-control table", path).into());
        }
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut weights = HashMap::new();
        for row in rdr.deserialize::<CcRow>() {
            let row = row.with_context(|| format!("Failed to parse {}", path.display()))?;
            if let Some(cc) = row.cc_count {
                weights.insert(row.name.trim().to_string(), cc);
            }
        }
        info!("Loaded CC weights for {} champion(s)", weights.len());
        Ok(Self { weights })
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            weights: pairs
                .into_iter()
                .map(|(name, w)| (name.to_string(), w))
                .collect(),
        }
    }

    pub fn weight(&self, champion: &str) -> Option<f64> {
        self.weights.get(champion).copied()
    }
}

/// Role a champion plays given its keystone rune.
/// CSV layout: `name` column, then one column per rune holding the role.
#[derive(Debug, Clone, Default)]
pub struct RuneRoles {
    roles: HashMap<String, HashMap<String, String>>,
}

impl RuneRoles {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::missing("rune role table", path).into());
        }
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let headers: Vec<String> = rdr
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let Some(name_idx) = headers.iter().position(|h| h == "name") else {
            return Err(ConfigError::MissingColumns {
                path: path.to_path_buf(),
                columns: vec!["name".to_string()],
            }
            .into());
        };

        let mut roles = HashMap::new();
        for record in rdr.records() {
            let record = record.with_context(|| format!("Failed to parse {}", path.display()))?;
            let Some(name) = record.get(name_idx).map(str::trim) else {
                continue;
            };
            let by_rune: HashMap<String, String> = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != name_idx)
                .filter_map(|(i, rune)| {
                    let role = record.get(i)?.trim();
                    (!role.is_empty()).then(|| (rune.clone(), role.to_string()))
                })
                .collect();
            roles.insert(name.to_string(), by_rune);
        }
        info!("Loaded rune roles for {} champion(s)", roles.len());
        Ok(Self { roles })
    }

    pub fn insert(&mut self, champion: &str, rune: &str, role: &str) {
        self.roles
            .entry(champion.to_string())
            .or_default()
            .insert(rune.to_string(), role.to_string());
    }

    pub fn role(&self, champion: &str, rune: &str) -> Option<&str> {
        self.roles.get(champion)?.get(rune).map(String::as_str)
    }
}

/// Cross-language and OCR-noise translation tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasTable {
    /// Classifier label -> canonical champion name
    #[serde(default)]
    pub champions: HashMap<String, String>,
    /// Classifier label -> canonical rune name
    #[serde(default)]
    pub runes: HashMap<String, String>,
    /// Known OCR misreads -> corrected text
    #[serde(default)]
    pub ocr_corrections: HashMap<String, String>,
}

impl AliasTable {
    /// Missing alias file is not fatal: labels are then used as-is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "No alias table at {}. Classifier labels will be used untranslated",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let table: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(
            "Loaded {} champion alias(es), {} rune alias(es)",
            table.champions.len(),
            table.runes.len()
        );
        Ok(table)
    }

    pub fn champion<'a>(&'a self, label: &'a str) -> &'a str {
        self.champions.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn rune<'a>(&'a self, label: &'a str) -> &'a str {
        self.runes.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn correct_ocr<'a>(&'a self, text: &'a str) -> &'a str {
        self.ocr_corrections
            .get(text)
            .map(String::as_str)
            .unwrap_or(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_table_lookup() {
        let json = r#"{
            "Lux": {
                "Support": {"enemy_ad+cc_low": ["Moonstone", "Ardent"], "tanks_high+cc_high": []},
                "AP": {"enemy_ap+cc_high": ["Luden", "Zhonya"]}
            }
        }"#;
        let table: BuildTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.roles_for("Lux"), vec!["AP", "Support"]);
        assert_eq!(
            table.lookup("Lux", "AP", "enemy_ap+cc_high").unwrap(),
            &["Luden".to_string(), "Zhonya".to_string()]
        );
        assert!(table.lookup("Lux", "Support", "tanks_high+cc_high").is_none());
        assert!(table.lookup("Zed", "AD", "enemy_ad+cc_low").is_none());
        assert_eq!(table.situations("Lux", "Support").count(), 2);
        assert!(table.roles_for("Zed").is_empty());
    }

    #[test]
    fn test_missing_build_table_is_config_error() {
        let err = BuildTable::load(Path::new("/nonexistent/builds.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingArtifact { artifact: "build table", .. })
        ));
    }

    #[test]
    fn test_cc_weights_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,CCcount\nLeona,3\nAshe,1\nZed,").unwrap();
        let cc = CcWeights::load(file.path()).unwrap();
        assert_eq!(cc.weight("Leona"), Some(3.0));
        assert_eq!(cc.weight("Zed"), None);
        assert_eq!(cc.weight("Nobody"), None);
    }

    #[test]
    fn test_rune_roles_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,Electrocute,Aftershock\nLeona,,Tank\nLux,AP,").unwrap();
        let roles = RuneRoles::load(file.path()).unwrap();
        assert_eq!(roles.role("Leona", "Aftershock"), Some("Tank"));
        assert_eq!(roles.role("Leona", "Electrocute"), None);
        assert_eq!(roles.role("Lux", "Electrocute"), Some("AP"));
    }

    #[test]
    fn test_alias_passthrough() {
        let mut aliases = AliasTable::default();
        aliases
            .champions
            .insert("Wukong".to_string(), "오공".to_string());
        assert_eq!(aliases.champion("Wukong"), "오공");
        assert_eq!(aliases.champion("Ahri"), "Ahri");
        assert!(AliasTable::load(Path::new("/nonexistent/aliases.json")).is_ok());
    }
}
